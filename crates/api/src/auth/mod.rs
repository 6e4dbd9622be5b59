//! Credential and token primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- signed identity tokens.

pub mod jwt;
pub mod password;
