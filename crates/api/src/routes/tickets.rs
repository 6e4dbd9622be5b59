use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tickets;
use crate::state::AppState;

/// Routes mounted at `/tickets`.
///
/// `/all` is registered alongside `/{id}`; axum prefers the static segment.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(tickets::create))
        .route("/all", get(tickets::list_all))
        .route("/{id}", get(tickets::check).put(tickets::update))
}
