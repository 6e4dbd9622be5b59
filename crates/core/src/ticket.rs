//! Ticket records, payload validation and the creation quota.
//!
//! A ticket moves one way only: `isFixed = false` on creation, `true` once a
//! technician resolves it.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::payload::{required_bool, required_string};
use crate::types::{DbId, Timestamp};

/// Tickets one owner may hold. Counted over all of the owner's tickets,
/// resolved ones included.
pub const MAX_TICKETS_PER_OWNER: u64 = 4;

/// Projection used for quota and state-transition checks.
pub const TICKET_STATUS_FIELDS: &str = "isFixed ownerEmail id";

/// Projection used for owner-facing lookups.
pub const TICKET_SUMMARY_FIELDS: &str = "isFixed id";

/// Domain event emitted when a ticket is marked fixed.
pub const EVENT_TICKET_RESOLVED: &str = "ticket.resolved";

/// Full ticket record as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: DbId,
    pub brand: String,
    pub model: String,
    pub issue: String,
    pub is_fixed: bool,
    pub owner_email: String,
    pub is_active: bool,
    pub is_deleted: bool,
    pub time_stamp: i64,
    pub created_on: Timestamp,
    pub updated_on: Timestamp,
}

/// Projected view carrying only what the state checks need.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketStatus {
    pub id: DbId,
    #[serde(default)]
    pub is_fixed: bool,
    #[serde(default)]
    pub owner_email: Option<String>,
}

/// Validated creation payload. The owner is never taken from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDraft {
    pub brand: String,
    pub model: String,
    pub issue: String,
}

impl TicketDraft {
    /// Validate a raw creation payload. Any `ownerEmail` it carries is ignored.
    pub fn from_payload(payload: &Value) -> Result<Self, CoreError> {
        Ok(Self {
            brand: required_string(payload, "brand", "brand is required")?,
            model: required_string(payload, "model", "model is missing")?,
            issue: required_string(payload, "issue", "issue is missing")?,
        })
    }

    /// Attach the authenticated owner and default record fields.
    pub fn into_new_ticket(self, owner_email: &str) -> NewTicket {
        let now = Utc::now();
        NewTicket {
            brand: self.brand,
            model: self.model,
            issue: self.issue,
            is_fixed: false,
            owner_email: owner_email.to_string(),
            is_active: true,
            is_deleted: false,
            time_stamp: now.timestamp_millis(),
            created_on: now,
            updated_on: now,
        }
    }
}

/// Insert shape for a ticket; the store assigns `id`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    pub brand: String,
    pub model: String,
    pub issue: String,
    pub is_fixed: bool,
    pub owner_email: String,
    pub is_active: bool,
    pub is_deleted: bool,
    pub time_stamp: i64,
    pub created_on: Timestamp,
    pub updated_on: Timestamp,
}

/// Validated update patch. Only `isFixed` is mutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketPatch {
    pub is_fixed: bool,
}

impl TicketPatch {
    pub fn from_payload(payload: &Value) -> Result<Self, CoreError> {
        Ok(Self {
            is_fixed: required_bool(payload, "isFixed", "isFixed is missing")?,
        })
    }
}

/// Fail when `existing` tickets already reach the per-owner quota.
pub fn check_quota(existing: u64) -> Result<(), CoreError> {
    if existing >= MAX_TICKETS_PER_OWNER {
        return Err(CoreError::Validation(format!(
            "You cannot create more than {MAX_TICKETS_PER_OWNER} tickets"
        )));
    }
    Ok(())
}

/// Parse a path identifier. Blank or non-numeric input counts as absent.
pub fn parse_ticket_id(raw: &str) -> Option<DbId> {
    raw.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn draft_requires_all_fields() {
        let err = TicketDraft::from_payload(&json!({"model": "X1", "issue": "cracked"}))
            .unwrap_err();
        assert_eq!(err, CoreError::Validation("brand is required".into()));

        let err = TicketDraft::from_payload(&json!({"brand": "Acme", "model": "", "issue": "x"}))
            .unwrap_err();
        assert_eq!(err, CoreError::Validation("model is missing".into()));

        assert_matches!(
            TicketDraft::from_payload(&json!({"brand": "Acme", "model": "X1"})),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn client_owner_email_is_ignored() {
        let payload = json!({
            "brand": "Acme",
            "model": "X1",
            "issue": "won't boot",
            "ownerEmail": "mallory@evil.com"
        });
        let ticket = TicketDraft::from_payload(&payload)
            .unwrap()
            .into_new_ticket("ada@example.com");
        assert_eq!(ticket.owner_email, "ada@example.com");
        assert!(!ticket.is_fixed);
        assert!(ticket.is_active);
    }

    #[test]
    fn new_ticket_serializes_camel_case() {
        let ticket = TicketDraft {
            brand: "Acme".into(),
            model: "X1".into(),
            issue: "fan noise".into(),
        }
        .into_new_ticket("ada@example.com");
        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["ownerEmail"], "ada@example.com");
        assert_eq!(json["isFixed"], false);
        assert!(json["createdOn"].is_string());
    }

    #[test]
    fn quota_boundary() {
        assert!(check_quota(0).is_ok());
        assert!(check_quota(3).is_ok());
        assert_eq!(
            check_quota(4).unwrap_err(),
            CoreError::Validation("You cannot create more than 4 tickets".into())
        );
        assert!(check_quota(9).is_err());
    }

    #[test]
    fn patch_requires_boolean() {
        assert_eq!(
            TicketPatch::from_payload(&json!({"isFixed": true})).unwrap(),
            TicketPatch { is_fixed: true }
        );
        assert!(TicketPatch::from_payload(&json!({"brand": "Acme"})).is_err());
        assert!(TicketPatch::from_payload(&json!({"isFixed": "true"})).is_err());
    }

    #[test]
    fn ticket_ids() {
        assert_eq!(parse_ticket_id("12"), Some(12));
        assert_eq!(parse_ticket_id(" "), None);
        assert_eq!(parse_ticket_id("abc"), None);
    }

    #[test]
    fn status_projection_deserializes() {
        let status: TicketStatus = serde_json::from_value(json!({"id": 3, "isFixed": true})).unwrap();
        assert_eq!(status.id, 3);
        assert!(status.is_fixed);
        assert_eq!(status.owner_email, None);
    }
}
