//! Role guards.
//!
//! Each extractor wraps [`AuthUser`] and rejects callers with any other role.
//! A role mismatch is reported as 401, the same as a missing token.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use repairdesk_core::error::CoreError;
use repairdesk_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Fail unless `user` holds `required`.
pub fn require_role(user: AuthUser, required: Role) -> Result<AuthUser, AppError> {
    if user.role == required {
        Ok(user)
    } else {
        Err(AppError::Core(CoreError::Unauthorized(format!(
            "You are not a {required}"
        ))))
    }
}

/// Requires the `technician` role.
///
/// ```ignore
/// async fn resolve(RequireTechnician(user): RequireTechnician) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireTechnician(pub AuthUser);

impl FromRequestParts<AppState> for RequireTechnician {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        require_role(user, Role::Technician).map(RequireTechnician)
    }
}

/// Requires the `client` role.
pub struct RequireClient(pub AuthUser);

impl FromRequestParts<AppState> for RequireClient {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        require_role(user, Role::Client).map(RequireClient)
    }
}
