//! Domain event sink.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`. Publishing is fire-and-forget.
//! - [`DomainEvent`] -- the event envelope.
//! - [`EventLogger`] -- subscriber that writes every event to the log.

pub mod bus;
pub mod logger;

pub use bus::{DomainEvent, EventBus};
pub use logger::EventLogger;
