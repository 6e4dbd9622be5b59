use std::sync::Arc;

use repairdesk_core::store::RecordStore;
use repairdesk_events::EventBus;

use crate::config::ServerConfig;
use crate::services::{ResourceOps, TicketService, UserService};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (read by the auth extractors).
    pub config: Arc<ServerConfig>,
    /// Record store shared by every service.
    pub store: Arc<dyn RecordStore>,
    /// Domain event sink.
    pub event_bus: Arc<EventBus>,
    pub tickets: TicketService,
    pub users: UserService,
}

impl AppState {
    /// Wire the services onto one store and event bus.
    pub fn new(config: ServerConfig, store: Arc<dyn RecordStore>, event_bus: Arc<EventBus>) -> Self {
        let ops = ResourceOps::new(Arc::clone(&store), Arc::clone(&event_bus), config.environment);
        let jwt = Arc::new(config.jwt.clone());

        Self {
            config: Arc::new(config),
            store,
            event_bus,
            tickets: TicketService::new(ops.clone()),
            users: UserService::new(ops, jwt),
        }
    }
}
