use axum::extract::State;
use axum::{routing::get, Json, Router};
use repairdesk_core::query::{build_query, QueryOptions};
use repairdesk_core::store::USERS;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the record store answered.
    pub store: bool,
}

/// GET /health -- returns service and record store health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let check = build_query(&QueryOptions::new().with_count(true));
    let store = match state.store.read_records(USERS, &check).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Record store health check failed");
            false
        }
    };

    let status = if store { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        store,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
