use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use repairdesk_core::envelope::ResponseEnvelope;
use repairdesk_core::error::{status_for, CoreError, STATUS_BAD_REQUEST};

use crate::response::EnvelopeResponse;

/// Errors raised outside the services, mostly by request extractors.
///
/// Renders as the same `{payload, error, status}` shape the services return.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error.
    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        let code = match self {
            AppError::Core(core) => status_for(core).unwrap_or(STATUS_BAD_REQUEST),
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let AppError::Core(CoreError::Controller(msg)) = &self {
            tracing::error!(error = %msg, "Controller error outside a service");
        }
        let AppError::Core(core) = self;
        let message = core.to_string();
        EnvelopeResponse::new(ResponseEnvelope::failed(message, status.as_u16())).into_response()
    }
}
