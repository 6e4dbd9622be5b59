use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use repairdesk_core::store::RecordStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repairdesk_api::config::ServerConfig;
use repairdesk_api::router::build_app_router;
use repairdesk_api::state::AppState;
use repairdesk_db::{MemoryRecordStore, PgRecordStore};
use repairdesk_events::{EventBus, EventLogger};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repairdesk_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        environment = %config.environment,
        "Loaded server configuration"
    );

    // --- Record store ---
    let store: Arc<dyn RecordStore> = match &config.database_url {
        Some(database_url) => {
            let pool = repairdesk_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            repairdesk_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            repairdesk_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgRecordStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory record store");
            Arc::new(MemoryRecordStore::new())
        }
    };

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let logger_handle = tokio::spawn(EventLogger::run(event_bus.subscribe()));
    tracing::info!("Event bus created, logger subscribed");

    // --- App state + router ---
    let state = AppState::new(config.clone(), store, Arc::clone(&event_bus));
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // The router (and every service clone of the bus) is gone; dropping the
    // last sender closes the channel and stops the logger.
    drop(event_bus);
    match tokio::time::timeout(Duration::from_secs(5), logger_handle).await {
        Ok(Ok(logged)) => tracing::info!(logged, "Event logger stopped"),
        Ok(Err(e)) => tracing::error!(error = %e, "Event logger task failed"),
        Err(_) => tracing::warn!("Event logger did not stop in time"),
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
