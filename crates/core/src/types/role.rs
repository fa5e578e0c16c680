//! User role enum.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Role of an account.
///
/// Admins manage the product catalog; regular users own carts. The role is
/// stored as lowercase text in the database and carried in token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular shopper account.
    User,
    /// Catalog administrator.
    Admin,
}

impl Role {
    /// Stable string form, matching the database representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Whether this role has catalog write access.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// Error returned when parsing an unrecognized role string.
#[derive(thiserror::Error, Debug, Clone)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::Admin.as_str(), "admin");
    }

    #[test]
    fn test_unknown_role() {
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::User.is_admin());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(json, "\"admin\"");
        let back: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(back, Role::User);
    }
}
