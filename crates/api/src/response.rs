//! Rendering of [`ResponseEnvelope`]s onto HTTP responses.
//!
//! The envelope status becomes the HTTP status. The body is
//! `{ "payload": ..., "error": ..., "status": ... }` unless the envelope asks
//! for a raw response, in which case the payload is sent as-is with the
//! envelope's content type.

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use repairdesk_core::envelope::ResponseEnvelope;
use serde_json::{json, Value};

use crate::auth::jwt::AUTH_TOKEN_HEADER;

/// An envelope on its way out, optionally carrying a freshly issued token.
#[derive(Debug)]
pub struct EnvelopeResponse {
    pub envelope: ResponseEnvelope,
    pub auth_token: Option<String>,
}

impl EnvelopeResponse {
    pub fn new(envelope: ResponseEnvelope) -> Self {
        Self {
            envelope,
            auth_token: None,
        }
    }

    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }
}

impl From<ResponseEnvelope> for EnvelopeResponse {
    fn from(envelope: ResponseEnvelope) -> Self {
        Self::new(envelope)
    }
}

impl IntoResponse for EnvelopeResponse {
    fn into_response(self) -> Response {
        let envelope = self.envelope;
        let status =
            StatusCode::from_u16(envelope.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = if envelope.send_raw_response && envelope.is_success() {
            let body = match envelope.payload {
                Some(Value::String(s)) => s,
                Some(other) => other.to_string(),
                None => String::new(),
            };
            let mut response = (status, body).into_response();
            if let Ok(content_type) = HeaderValue::from_str(&envelope.response_type) {
                response.headers_mut().insert(CONTENT_TYPE, content_type);
            }
            response
        } else {
            let body = json!({
                "payload": envelope.payload,
                "error": envelope.error,
                "status": envelope.status,
            });
            (status, Json(body)).into_response()
        };

        if let Some(token) = self.auth_token {
            match HeaderValue::from_str(&token) {
                Ok(value) => {
                    response
                        .headers_mut()
                        .insert(HeaderName::from_static(AUTH_TOKEN_HEADER), value);
                }
                Err(e) => tracing::error!(error = %e, "Issued token is not a valid header value"),
            }
        }

        response
    }
}
