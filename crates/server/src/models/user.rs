//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use warung_core::{Email, Role, UserId, Username};

/// An account (domain type).
///
/// The password hash is deliberately not part of this type; repositories
/// return it separately where verification needs it, so a `User` can always
/// be serialized into an API response as-is.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login username.
    pub username: Username,
    /// Email address.
    pub email: Email,
    /// Account role.
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
