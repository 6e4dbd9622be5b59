//! Subscriber that writes domain events to the log.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::bus::DomainEvent;

pub struct EventLogger;

impl EventLogger {
    /// Log events until the bus is dropped. Returns how many were logged.
    pub async fn run(mut receiver: broadcast::Receiver<DomainEvent>) -> u64 {
        let mut logged = 0;
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    tracing::info!(
                        event = %event.name,
                        collection = ?event.collection,
                        record_id = ?event.record_id,
                        data = %event.data,
                        "Domain event"
                    );
                    logged += 1;
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event logger lagged, events dropped");
                }
                Err(RecvError::Closed) => {
                    tracing::debug!(logged, "Event bus closed, logger stopping");
                    return logged;
                }
            }
        }
    }
}
