//! Repairdesk domain core.
//!
//! Pure building blocks shared by the store implementations and the API
//! server: the error-kind enum and its classifier, the query builder, the
//! response envelope, the record store contract, and the ticket/user models
//! with their payload validation. Nothing in here performs I/O.

pub mod envelope;
pub mod error;
pub mod payload;
pub mod query;
pub mod roles;
pub mod store;
pub mod ticket;
pub mod types;
pub mod user;
