//! Request handlers.
//!
//! Handlers extract identity, path and body, call the matching service method
//! and render the returned envelope. They hold no domain rules of their own.

pub mod tickets;
pub mod users;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde_json::Value;

/// Unwrap a JSON body, treating an unreadable one as an empty payload so the
/// services report their own validation message.
pub(crate) fn body_or_null(body: Result<Json<Value>, JsonRejection>) -> Value {
    match body {
        Ok(Json(value)) => value,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Unreadable JSON body");
            Value::Null
        }
    }
}
