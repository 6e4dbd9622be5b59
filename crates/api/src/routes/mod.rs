pub mod health;
pub mod tickets;
pub mod users;

use axum::Router;
use repairdesk_core::error::CoreError;

use crate::error::AppError;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /users                       register (public)
/// /users/login                 login (public, issues x-auth-token)
///
/// /tickets                     create (client)
/// /tickets/all?email=          list an owner's tickets (any authenticated caller)
/// /tickets/{id}                check own ticket (GET), resolve (PUT, technician)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/tickets", tickets::router())
}

/// Fallback for paths no route matches, rendered as an envelope.
pub async fn not_found() -> AppError {
    AppError::Core(CoreError::NotFound("Route not found".into()))
}
