//! Uniform success/failure envelope returned by every service operation,
//! and the classifiers that turn raw store outcomes into one.

use serde::Serialize;
use serde_json::Value;

use crate::error::FormattedError;
use crate::store::{document_id, Document, ReadOutcome, UpdateOutcome};

pub const DEFAULT_RESPONSE_TYPE: &str = "application/json";

pub const MSG_RESOURCE_NOT_FOUND: &str = "Resource not found";
pub const MSG_RESOURCES_NOT_FOUND: &str = "Resources not found";
pub const MSG_UPDATE_FAILED: &str = "Update failed";
pub const MSG_DELETION_FAILED: &str = "Deletion failed.";

/// Transport-agnostic result of a service call.
///
/// Exactly one of `payload` / `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub payload: Option<Value>,
    pub error: Option<String>,
    pub status: u16,
    pub response_type: String,
    pub send_raw_response: bool,
}

impl ResponseEnvelope {
    /// Failure envelope with the given status.
    pub fn failed(message: impl Into<String>, code: u16) -> Self {
        Self {
            payload: None,
            error: Some(message.into()),
            status: code,
            response_type: DEFAULT_RESPONSE_TYPE.to_string(),
            send_raw_response: false,
        }
    }

    /// `200` JSON success envelope.
    pub fn successful(payload: Value) -> Self {
        Self::successful_with(payload, 200, false, DEFAULT_RESPONSE_TYPE)
    }

    pub fn successful_with(
        payload: Value,
        code: u16,
        send_raw_response: bool,
        response_type: &str,
    ) -> Self {
        Self {
            payload: Some(payload),
            error: None,
            status: code,
            response_type: response_type.to_string(),
            send_raw_response,
        }
    }

    /// Failure envelope from a classified error, `default` when unclassified.
    pub fn from_error(formatted: FormattedError, default: u16) -> Self {
        let status = formatted.status_or(default);
        Self::failed(formatted.error_message, status)
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Three-way classification of an update outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// Acknowledged and at least one record changed.
    Modified,
    /// Acknowledged but nothing changed.
    Unchanged,
    /// Not acknowledged.
    Failed,
}

pub fn classify_update(result: Option<&UpdateOutcome>) -> UpdateKind {
    match result {
        Some(r) if r.ok && r.n_modified > 0 => UpdateKind::Modified,
        Some(r) if r.ok => UpdateKind::Unchanged,
        _ => UpdateKind::Failed,
    }
}

/// Success if the record exists and carries an `id`; 404 otherwise.
pub fn process_single_read(result: Option<Document>) -> ResponseEnvelope {
    match result {
        Some(doc) if document_id(&doc).is_some() => ResponseEnvelope::successful(Value::Object(doc)),
        _ => ResponseEnvelope::failed(MSG_RESOURCE_NOT_FOUND, 404),
    }
}

/// Success for any collection, including an empty one or a count; 404 only
/// when there is no result at all.
pub fn process_multiple_read_results(result: Option<ReadOutcome>) -> ResponseEnvelope {
    match result {
        Some(ReadOutcome::Records(records)) => ResponseEnvelope::successful(Value::Array(
            records.into_iter().map(Value::Object).collect(),
        )),
        Some(ReadOutcome::Count { count }) => {
            ResponseEnvelope::successful(serde_json::json!({ "count": count }))
        }
        None => ResponseEnvelope::failed(MSG_RESOURCES_NOT_FOUND, 404),
    }
}

/// `200` when records changed, `204` for an acknowledged no-op, `400` when the
/// store did not acknowledge.
pub fn process_update_result(result: Option<&UpdateOutcome>) -> ResponseEnvelope {
    match (classify_update(result), result) {
        (UpdateKind::Modified, Some(r)) => ResponseEnvelope::successful(outcome_value(r)),
        (UpdateKind::Unchanged, Some(r)) => {
            ResponseEnvelope::successful_with(outcome_value(r), 204, false, DEFAULT_RESPONSE_TYPE)
        }
        _ => ResponseEnvelope::failed(MSG_UPDATE_FAILED, 400),
    }
}

/// Soft-delete outcome: success when something was marked, otherwise a
/// failure that still carries status `200`.
pub fn process_delete_result(result: Option<&UpdateOutcome>) -> ResponseEnvelope {
    match result {
        Some(r) if r.n_modified > 0 => ResponseEnvelope::successful(outcome_value(r)),
        _ => ResponseEnvelope::failed(MSG_DELETION_FAILED, 200),
    }
}

fn outcome_value(outcome: &UpdateOutcome) -> Value {
    serde_json::to_value(outcome).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn failed_envelope_has_no_payload() {
        let env = ResponseEnvelope::failed("nope", 400);
        assert_eq!(env.payload, None);
        assert_eq!(env.error.as_deref(), Some("nope"));
        assert_eq!(env.status, 400);
        assert!(!env.is_success());
    }

    #[test]
    fn successful_envelope_defaults() {
        let env = ResponseEnvelope::successful(json!({"id": 1}));
        assert_eq!(env.status, 200);
        assert_eq!(env.error, None);
        assert_eq!(env.response_type, "application/json");
        assert!(!env.send_raw_response);
    }

    #[test]
    fn single_read_requires_an_id() {
        assert_eq!(process_single_read(Some(doc(json!({"id": 4})))).status, 200);

        let missing_id = process_single_read(Some(doc(json!({"brand": "Acme"}))));
        assert_eq!(missing_id.status, 404);
        assert_eq!(missing_id.error.as_deref(), Some(MSG_RESOURCE_NOT_FOUND));

        assert_eq!(process_single_read(None).status, 404);
    }

    #[test]
    fn multiple_read_accepts_empty_and_count() {
        let empty = process_multiple_read_results(Some(ReadOutcome::Records(vec![])));
        assert_eq!(empty.status, 200);
        assert_eq!(empty.payload, Some(json!([])));

        let zero = process_multiple_read_results(Some(ReadOutcome::Count { count: 0 }));
        assert_eq!(zero.payload, Some(json!({"count": 0})));

        let none = process_multiple_read_results(None);
        assert_eq!(none.status, 404);
        assert_eq!(none.error.as_deref(), Some(MSG_RESOURCES_NOT_FOUND));
    }

    #[test]
    fn update_result_three_ways() {
        let modified = UpdateOutcome { ok: true, n_modified: 1 };
        let unchanged = UpdateOutcome { ok: true, n_modified: 0 };
        let rejected = UpdateOutcome { ok: false, n_modified: 0 };

        assert_eq!(process_update_result(Some(&modified)).status, 200);
        assert_eq!(process_update_result(Some(&unchanged)).status, 204);
        assert!(process_update_result(Some(&unchanged)).is_success());

        let failed = process_update_result(Some(&rejected));
        assert_eq!(failed.status, 400);
        assert_eq!(failed.error.as_deref(), Some(MSG_UPDATE_FAILED));
        assert_eq!(process_update_result(None).status, 400);
    }

    #[test]
    fn unchanged_update_is_stable() {
        let unchanged = UpdateOutcome { ok: true, n_modified: 0 };
        let first = process_update_result(Some(&unchanged));
        let second = process_update_result(Some(&unchanged));
        assert_eq!(first, second);
        assert_eq!(second.status, 204);
    }

    #[test]
    fn delete_failure_is_soft() {
        let marked = UpdateOutcome { ok: true, n_modified: 2 };
        assert!(process_delete_result(Some(&marked)).is_success());

        let none = UpdateOutcome { ok: true, n_modified: 0 };
        let failed = process_delete_result(Some(&none));
        assert_eq!(failed.status, 200);
        assert_eq!(failed.error.as_deref(), Some(MSG_DELETION_FAILED));
    }
}
