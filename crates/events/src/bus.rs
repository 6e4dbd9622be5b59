//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>`. There is no delivery
//! guarantee: with no subscribers, or a lagging one, events are dropped.

use chrono::{DateTime, Utc};
use repairdesk_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// Something that happened to a record, e.g. `"ticket.resolved"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Dot-separated event name.
    pub name: String,

    /// Collection of the affected record, if any.
    pub collection: Option<String>,

    /// Id of the affected record, if any.
    pub record_id: Option<DbId>,

    /// Free-form data, usually the raw store outcome.
    pub data: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl DomainEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collection: None,
            record_id: None,
            data: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_record(mut self, collection: impl Into<String>, record_id: DbId) -> Self {
        self.collection = Some(collection.into());
        self.record_id = Some(record_id);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

const DEFAULT_CAPACITY: usize = 256;

pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unconsumed events are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers.
    pub fn emit(&self, event: DomainEvent) {
        // A send error only means nobody is listening.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
