//! Account roles.
//!
//! Roles are fixed at registration; there is no role-change path.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_TECHNICIAN: &str = "technician";
pub const ROLE_CLIENT: &str = "client";

/// The two account roles known to the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Resolves tickets.
    Technician,
    /// Opens tickets for their own devices.
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Technician => ROLE_TECHNICIAN,
            Role::Client => ROLE_CLIENT,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_TECHNICIAN => Ok(Role::Technician),
            ROLE_CLIENT => Ok(Role::Client),
            other => Err(CoreError::Validation(format!(
                "Invalid role '{other}'. Must be one of: {ROLE_TECHNICIAN}, {ROLE_CLIENT}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parses_known_roles() {
        assert_eq!("technician".parse::<Role>().unwrap(), Role::Technician);
        assert_eq!("client".parse::<Role>().unwrap(), Role::Client);
    }

    #[test]
    fn rejects_unknown_role() {
        assert_matches!("admin".parse::<Role>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_value(Role::Technician).unwrap();
        assert_eq!(json, "technician");
        assert_eq!(Role::Client.to_string(), "client");
    }
}
