//! Domain error kinds and the error classifier.
//!
//! Every failure a service can raise is one of the [`CoreError`] variants.
//! [`format_error`] turns one into a status code and a message whose
//! verbosity depends on the deployment [`Environment`].

use std::fmt;
use std::str::FromStr;

/// Status for user-caused failures (malformed payloads, business rules).
pub const STATUS_VALIDATION: u16 = 412;
/// Status for persistence-layer failures.
pub const STATUS_CONTROLLER: u16 = 500;
/// Status for missing or rejected credentials.
pub const STATUS_UNAUTHORIZED: u16 = 401;
/// Status for ownership-scoped lookups that matched nothing.
pub const STATUS_NOT_FOUND: u16 = 404;
/// Default status for unclassified failures.
pub const STATUS_BAD_REQUEST: u16 = 400;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Client-caused: malformed input or a business-rule violation.
    #[error("{0}")]
    Validation(String),

    /// The record store failed or rejected a write.
    #[error("{0}")]
    Controller(String),

    /// Missing or invalid token, or a role mismatch.
    #[error("{0}")]
    Unauthorized(String),

    /// A scoped lookup matched no record.
    #[error("{0}")]
    NotFound(String),

    /// Unclassified failure; the caller picks the status.
    #[error("{0}")]
    Rejected(String),
}

/// Deployment posture, controls how much context error messages carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Production => f.write_str("production"),
        }
    }
}

impl FromStr for Environment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(CoreError::Validation(format!(
                "Unknown environment '{other}'. Must be development or production"
            ))),
        }
    }
}

/// Output of [`format_error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedError {
    pub error_message: String,
    /// `None` for unclassified errors; the caller applies its own default.
    pub status_code: Option<u16>,
}

impl FormattedError {
    /// Resolve the final status, falling back to `default` when unclassified.
    pub fn status_or(&self, default: u16) -> u16 {
        self.status_code.unwrap_or(default)
    }
}

/// Map an error kind to its transport status, if it has one.
pub fn status_for(error: &CoreError) -> Option<u16> {
    match error {
        CoreError::Validation(_) => Some(STATUS_VALIDATION),
        CoreError::Controller(_) => Some(STATUS_CONTROLLER),
        CoreError::Unauthorized(_) => Some(STATUS_UNAUTHORIZED),
        CoreError::NotFound(_) => Some(STATUS_NOT_FOUND),
        CoreError::Rejected(_) => None,
    }
}

/// Classify `error` raised by `service::operation`.
///
/// In development the message is prefixed with `[service] operation:`; in
/// production only the error's own message is exposed.
pub fn format_error(
    service: &str,
    operation: &str,
    error: &CoreError,
    environment: Environment,
) -> FormattedError {
    let error_message = if environment.is_development() {
        format!("[{service}] {operation}: {error}")
    } else {
        error.to_string()
    };

    FormattedError {
        error_message,
        status_code: status_for(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_412() {
        let formatted = format_error(
            "TicketService",
            "createTicket",
            &CoreError::Validation("brand is required".into()),
            Environment::Production,
        );
        assert_eq!(formatted.status_code, Some(412));
        assert_eq!(formatted.error_message, "brand is required");
    }

    #[test]
    fn controller_maps_to_500() {
        let err = CoreError::Controller("connection reset".into());
        assert_eq!(status_for(&err), Some(500));
    }

    #[test]
    fn unclassified_uses_caller_default() {
        let formatted = format_error(
            "TicketService",
            "checkTicket",
            &CoreError::Rejected("not fixed yet".into()),
            Environment::Production,
        );
        assert_eq!(formatted.status_code, None);
        assert_eq!(formatted.status_or(400), 400);
        assert_eq!(formatted.status_or(401), 401);
    }

    #[test]
    fn development_includes_provenance() {
        let formatted = format_error(
            "UserService",
            "loginUser",
            &CoreError::Validation("Please supply login details".into()),
            Environment::Development,
        );
        assert_eq!(
            formatted.error_message,
            "[UserService] loginUser: Please supply login details"
        );
    }

    #[test]
    fn production_hides_provenance() {
        let formatted = format_error(
            "UserService",
            "loginUser",
            &CoreError::Controller("pool timed out".into()),
            Environment::Production,
        );
        assert!(!formatted.error_message.contains("UserService"));
        assert_eq!(formatted.error_message, "pool timed out");
    }

    #[test]
    fn environment_parsing() {
        assert_eq!("DEVELOPMENT".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert!("staging".parse::<Environment>().is_err());
        assert_eq!(Environment::default(), Environment::Production);
    }
}
