//! User domain types.

use chrono::{DateTime, Utc};

use shopfront_core::{Email, UserId};

/// A registered shopper or administrator.
///
/// The password hash is deliberately not part of this type; it only leaves the
/// repository through `UserRepository::get_login`.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: Email,
    /// Whether the user may reach `/admin` routes.
    pub is_admin: bool,
    /// When the account was registered.
    pub created_at: DateTime<Utc>,
}
