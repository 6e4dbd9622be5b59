//! Handlers for the `/users` resource (registration, login).

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::Value;

use super::body_or_null;
use crate::response::EnvelopeResponse;
use crate::state::AppState;

/// POST /users
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> EnvelopeResponse {
    state.users.create_user(&body_or_null(body)).await.into()
}

/// POST /users/login
///
/// The issued token travels in the `x-auth-token` response header as well as
/// in the payload.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> EnvelopeResponse {
    let (envelope, token) = state.users.login_user(&body_or_null(body)).await;
    EnvelopeResponse::new(envelope).with_auth_token(token)
}
