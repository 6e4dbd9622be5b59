//! Signed identity tokens.
//!
//! Tokens are HS256 JWTs carrying a [`Claims`] payload. They are presented
//! and issued through the `x-auth-token` header.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use repairdesk_core::roles::Role;
use repairdesk_core::types::DbId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Header used both to present and to issue tokens.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// JWT claims embedded in every token.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Subject -- the user's record id.
    pub sub: DbId,
    /// The record id again, under the name clients read it from.
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier.
    pub jti: String,
}

/// Identity a token is issued for.
#[derive(Debug, Clone)]
pub struct TokenSubject<'a> {
    pub id: DbId,
    pub email: &'a str,
    pub full_name: &'a str,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Token lifetime in minutes (default: 1440).
    pub token_expiry_mins: i64,
}

const DEFAULT_TOKEN_EXPIRY_MINS: i64 = 24 * 60;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var           | Required | Default |
    /// |-------------------|----------|---------|
    /// | `JWT_SECRET`      | **yes**  | --      |
    /// | `JWT_EXPIRY_MINS` | no       | `1440`  |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let token_expiry_mins: i64 = std::env::var("JWT_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_TOKEN_EXPIRY_MINS.to_string())
            .parse()
            .expect("JWT_EXPIRY_MINS must be a valid i64");

        Self {
            secret,
            token_expiry_mins,
        }
    }
}

/// Sign a token for `subject`.
pub fn generate_token(
    subject: &TokenSubject<'_>,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();

    let claims = Claims {
        sub: subject.id,
        id: subject.id,
        email: subject.email.to_string(),
        full_name: subject.full_name.to_string(),
        role: subject.role,
        exp: now + config.token_expiry_mins * 60,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify signature and expiry, returning the embedded [`Claims`].
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}
