//! Registration and login.

use std::sync::Arc;

use repairdesk_core::envelope::{self, ResponseEnvelope};
use repairdesk_core::error::{CoreError, STATUS_BAD_REQUEST};
use repairdesk_core::query::QueryOptions;
use repairdesk_core::store::{to_document, Document, USERS};
use repairdesk_core::user::{Credentials, LoginRecord, Registration, User, LOGIN_FIELDS, MSG_INVALID_LOGIN};
use serde_json::Value;

use super::resource::{condition, decode, ResourceOps};
use crate::auth::jwt::{generate_token, JwtConfig, TokenSubject};
use crate::auth::password::{hash_password_blocking, verify_password_blocking};

const SERVICE_NAME: &str = "UserService";

#[derive(Clone)]
pub struct UserService {
    ops: ResourceOps,
    jwt: Arc<JwtConfig>,
}

impl UserService {
    pub fn new(ops: ResourceOps, jwt: Arc<JwtConfig>) -> Self {
        Self { ops, jwt }
    }

    fn fail(&self, operation: &str, error: CoreError) -> ResponseEnvelope {
        self.ops.fail(SERVICE_NAME, operation, error, STATUS_BAD_REQUEST)
    }

    /// Register a user. The stored password is an Argon2 hash and the
    /// returned record never carries it.
    pub async fn create_user(&self, payload: &Value) -> ResponseEnvelope {
        match self.try_create_user(payload).await {
            Ok(user) => envelope::process_single_read(Some(user)),
            Err(e) => self.fail("createUser", e),
        }
    }

    async fn try_create_user(&self, payload: &Value) -> Result<Document, CoreError> {
        let mut registration = Registration::from_payload(payload)?;
        let plaintext = std::mem::take(&mut registration.password);
        let hash = hash_password_blocking(plaintext).await?;

        let stored = self
            .ops
            .create_record(USERS, &registration.into_new_user(hash))
            .await?;
        let user: User = decode(stored)?;
        tracing::info!(user_id = user.id, email = %user.email, role = %user.role, "User registered");

        Ok(to_document(&user)?)
    }

    /// Authenticate by email and password.
    ///
    /// Returns the envelope and, on success, the issued token for the
    /// transport to attach as a header. Unknown email and wrong password
    /// fail identically.
    pub async fn login_user(&self, payload: &Value) -> (ResponseEnvelope, Option<String>) {
        match self.try_login_user(payload).await {
            Ok(record) => {
                let token = record.token.clone();
                let envelope = match to_document(&record) {
                    Ok(doc) => envelope::process_single_read(Some(doc)),
                    Err(e) => return (self.fail("loginUser", e.into()), None),
                };
                (envelope, token)
            }
            Err(e) => (self.fail("loginUser", e), None),
        }
    }

    async fn try_login_user(&self, payload: &Value) -> Result<LoginRecord, CoreError> {
        let credentials = Credentials::from_payload(payload)?;
        let invalid = || CoreError::Validation(MSG_INVALID_LOGIN.into());

        let found = self
            .ops
            .handle_database_read(
                USERS,
                &QueryOptions::new().with_fields(LOGIN_FIELDS),
                condition("email", credentials.email.as_str()),
            )
            .await?
            .into_first();
        let Some(found) = found else {
            tracing::debug!(email = %credentials.email, "Login for unknown email");
            return Err(invalid());
        };

        let mut record: LoginRecord = decode(found)?;
        let hash = std::mem::take(&mut record.password);
        if !verify_password_blocking(credentials.password, hash).await? {
            tracing::debug!(email = %record.email, "Login with wrong password");
            return Err(invalid());
        }

        let token = generate_token(
            &TokenSubject {
                id: record.id,
                email: &record.email,
                full_name: &record.full_name,
                role: record.role,
            },
            &self.jwt,
        )
        .map_err(|e| CoreError::Controller(format!("Token generation failed: {e}")))?;

        tracing::info!(user_id = record.id, email = %record.email, "User logged in");
        record.token = Some(token);
        Ok(record)
    }
}
