//! User domain types.

use chrono::{DateTime, Utc};

use huellitas_core::{Email, UserId, Username};

/// A registered account (domain type).
///
/// The password hash never leaves the store layer; credential checks go
/// through the authentication service.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Email address, the login identifier. Globally unique.
    pub email: Email,
    /// Username derived from the email's local part. Globally unique.
    pub username: Username,
    /// Deactivated accounts cannot log in.
    pub is_active: bool,
    /// When the account was registered.
    pub registered_at: DateTime<Utc>,
}

/// Data required to insert a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub username: Username,
    /// Argon2id PHC-format hash of the password.
    pub password_hash: String,
    pub is_active: bool,
}
