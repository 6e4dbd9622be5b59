//! Helpers for validating raw JSON request payloads.

use serde_json::Value;

use crate::error::CoreError;

/// The payload as a JSON object, or a validation error.
pub fn as_object(payload: &Value) -> Result<&serde_json::Map<String, Value>, CoreError> {
    payload
        .as_object()
        .ok_or_else(|| CoreError::Validation("Payload must be a JSON object".into()))
}

/// A present, non-blank string field. `message` is returned otherwise.
pub fn required_string(payload: &Value, field: &str, message: &str) -> Result<String, CoreError> {
    match as_object(payload)?.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        _ => Err(CoreError::Validation(message.to_string())),
    }
}

/// A present boolean field. `message` is returned otherwise.
pub fn required_bool(payload: &Value, field: &str, message: &str) -> Result<bool, CoreError> {
    match as_object(payload)?.get(field) {
        Some(Value::Bool(b)) => Ok(*b),
        _ => Err(CoreError::Validation(message.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn rejects_non_object_payload() {
        assert!(as_object(&json!("brand")).is_err());
    }

    #[test]
    fn required_string_rejects_blank_and_wrong_type() {
        let payload = json!({"a": "  ", "b": 4, "c": "ok"});
        assert!(required_string(&payload, "a", "a missing").is_err());
        assert!(required_string(&payload, "b", "b missing").is_err());
        assert!(required_string(&payload, "z", "z missing").is_err());
        assert_eq!(required_string(&payload, "c", "c missing").unwrap(), "ok");
    }

    #[test]
    fn required_bool_message() {
        let err = required_bool(&json!({"isFixed": "yes"}), "isFixed", "isFixed is missing")
            .unwrap_err();
        assert_eq!(err, CoreError::Validation("isFixed is missing".into()));
    }
}
