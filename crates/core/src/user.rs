//! User records and registration/login payload validation.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::ValidateEmail;

use crate::error::CoreError;
use crate::payload::{as_object, required_string};
use crate::roles::Role;
use crate::types::{DbId, Timestamp};

/// Projection used by login: only what authentication needs.
pub const LOGIN_FIELDS: &str = "fullName password email id role";

/// Top-level domains accepted in registration emails.
const ALLOWED_TLDS: &[&str] = &["com", "net"];

/// Symbols that satisfy the password's special-character rule.
const PASSWORD_SYMBOLS: &str = "!_`,/@#-\"=:;~<>'$%^&*?|+()[]{}.";

const MIN_PASSWORD_LENGTH: usize = 8;

pub const MSG_INVALID_EMAIL: &str = "Email not valid";
pub const MSG_WEAK_PASSWORD: &str = "Password should contain a minimum of 8 characters \
     (upper and lowercase letters, numbers and at least one special character)";
pub const MSG_MISSING_LOGIN: &str = "Please supply login details";
pub const MSG_INVALID_LOGIN: &str = "Invalid email or password";

/// Full user row.
///
/// The password hash deserializes but never serializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub is_active: bool,
    pub is_deleted: bool,
    pub time_stamp: i64,
    pub created_on: Timestamp,
    pub updated_on: Timestamp,
}

/// Insert shape for a user; `password` already holds the hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub password: String,
    pub is_active: bool,
    pub is_deleted: bool,
    pub time_stamp: i64,
    pub created_on: Timestamp,
    pub updated_on: Timestamp,
}

/// Validated registration payload. Holds the plaintext password until hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub password: String,
}

impl Registration {
    pub fn from_payload(payload: &Value) -> Result<Self, CoreError> {
        let first_name = required_string(payload, "firstName", "First Name is required")?;
        let last_name = required_string(payload, "lastName", "Last Name is required")?;
        let role: Role = required_string(payload, "role", "Role is required")?.parse()?;
        let email = required_string(payload, "email", MSG_INVALID_EMAIL)?;
        validate_email(&email)?;
        let password = required_string(payload, "password", MSG_WEAK_PASSWORD)?;
        validate_password_complexity(&password)?;

        Ok(Self {
            first_name,
            last_name,
            email,
            role,
            password,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Build the insert shape, replacing the plaintext with `password_hash`.
    pub fn into_new_user(self, password_hash: String) -> NewUser {
        let now = Utc::now();
        NewUser {
            full_name: self.full_name(),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            role: self.role,
            password: password_hash,
            is_active: true,
            is_deleted: false,
            time_stamp: now.timestamp_millis(),
            created_on: now,
            updated_on: now,
        }
    }
}

/// Email must be well formed, have at least two domain labels, and end in
/// an allowed top-level domain.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    let invalid = || CoreError::Validation(MSG_INVALID_EMAIL.into());

    if !email.to_string().validate_email() {
        return Err(invalid());
    }
    let domain = email.rsplit_once('@').map(|(_, d)| d).ok_or_else(invalid)?;
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(invalid());
    }
    let tld = labels.last().map(|t| t.to_ascii_lowercase()).unwrap_or_default();
    if !ALLOWED_TLDS.contains(&tld.as_str()) {
        return Err(invalid());
    }
    Ok(())
}

/// At least 8 characters with a lowercase letter, an uppercase letter, a
/// digit and one of [`PASSWORD_SYMBOLS`].
pub fn validate_password_complexity(password: &str) -> Result<(), CoreError> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_LENGTH;
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));

    if long_enough && has_lower && has_upper && has_digit && has_symbol {
        Ok(())
    } else {
        Err(CoreError::Validation(MSG_WEAK_PASSWORD.into()))
    }
}

/// Email + password pair presented at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn from_payload(payload: &Value) -> Result<Self, CoreError> {
        let body = as_object(payload).map_err(|_| CoreError::Validation(MSG_MISSING_LOGIN.into()))?;
        let field = |name: &str| {
            body.get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        match (field("email"), field("password")) {
            (Some(email), Some(password)) => Ok(Self { email, password }),
            _ => Err(CoreError::Validation(MSG_MISSING_LOGIN.into())),
        }
    }
}

/// Login view of a user, read with [`LOGIN_FIELDS`] and returned with the
/// issued token. The hash is consumed for verification and never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRecord {
    pub id: DbId,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing, default)]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn registration_payload() -> Value {
        json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "role": "client",
            "email": "ada@example.com",
            "password": "Engine#1843"
        })
    }

    #[test]
    fn valid_registration() {
        let reg = Registration::from_payload(&registration_payload()).unwrap();
        assert_eq!(reg.full_name(), "Ada Lovelace");
        assert_eq!(reg.role, Role::Client);
    }

    #[test]
    fn registration_replaces_plaintext_with_hash() {
        let user = Registration::from_payload(&registration_payload())
            .unwrap()
            .into_new_user("$argon2id$fake".into());
        assert_eq!(user.password, "$argon2id$fake");
        assert_eq!(user.full_name, "Ada Lovelace");
    }

    #[test]
    fn registration_rejects_unknown_role() {
        let mut payload = registration_payload();
        payload["role"] = json!("admin");
        assert_matches!(Registration::from_payload(&payload), Err(CoreError::Validation(_)));
    }

    #[test]
    fn email_tld_restricted() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("ada@mail.example.net").is_ok());
        assert!(validate_email("ada@example.org").is_err());
        assert!(validate_email("ada@localhost").is_err());
        assert!(validate_email("not-an-email.com").is_err());
    }

    #[test]
    fn password_complexity_rules() {
        assert!(validate_password_complexity("Engine#1843").is_ok());
        assert!(validate_password_complexity("En#1").is_err(), "too short");
        assert!(validate_password_complexity("engine#1843").is_err(), "no uppercase");
        assert!(validate_password_complexity("ENGINE#1843").is_err(), "no lowercase");
        assert!(validate_password_complexity("Engine#xyz").is_err(), "no digit");
        assert!(validate_password_complexity("Engine18430").is_err(), "no symbol");
    }

    #[test]
    fn credentials_require_both_fields() {
        assert!(Credentials::from_payload(&json!({"email": "a@b.com", "password": "x"})).is_ok());
        assert_eq!(
            Credentials::from_payload(&json!({"email": "a@b.com"})).unwrap_err(),
            CoreError::Validation(MSG_MISSING_LOGIN.into())
        );
        assert!(Credentials::from_payload(&json!(null)).is_err());
    }

    #[test]
    fn login_record_never_serializes_hash() {
        let record: LoginRecord = serde_json::from_value(json!({
            "id": 1,
            "fullName": "Ada Lovelace",
            "email": "ada@example.com",
            "role": "client",
            "password": "$argon2id$secret"
        }))
        .unwrap();
        assert_eq!(record.password, "$argon2id$secret");

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("token").is_none());
    }
}
