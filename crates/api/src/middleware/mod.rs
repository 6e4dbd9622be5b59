//! Auth Guard extractors.
//!
//! - [`auth::AuthUser`] -- verifies the `x-auth-token` header and exposes the caller.
//! - [`rbac::RequireTechnician`] -- requires the `technician` role.
//! - [`rbac::RequireClient`] -- requires the `client` role.

pub mod auth;
pub mod rbac;
