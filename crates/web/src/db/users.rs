//! User store: trait + `PostgreSQL` implementation.
//!
//! The authentication service only sees the [`UserStore`] trait, so tests
//! can run it against an in-memory double. The production implementation
//! is [`PgUsers`], using the runtime sqlx API with row structs converted
//! into domain types.

use std::collections::HashSet;
use std::future::Future;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use huellitas_core::{Email, UserId, Username};

use super::RepositoryError;
use crate::models::user::{NewUser, User};

/// Error from attempting to insert a new account.
///
/// Email and username uniqueness are enforced by the database at commit
/// time; the two conflict variants let the registration flow distinguish
/// "email already registered" (a user error) from "username already taken"
/// (a lost derivation race, retried with a fresh candidate).
#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    /// An account with this email already exists.
    #[error("email already registered")]
    EmailTaken,

    /// The derived username was claimed between derivation and commit.
    #[error("username already taken")]
    UsernameTaken,

    /// Any other repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Store operations the authentication flow needs.
///
/// Futures carry a `Send` bound so services built on this trait stay
/// usable from axum handlers.
pub trait UserStore: Send + Sync {
    /// True when an account with this email exists.
    fn email_exists(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Snapshot of all usernames starting with the given prefix.
    ///
    /// Backs the existence predicate handed to the username deriver. The
    /// snapshot can go stale before the insert commits; `create` reports
    /// that as [`CreateUserError::UsernameTaken`].
    fn usernames_with_prefix(
        &self,
        prefix: &str,
    ) -> impl Future<Output = Result<HashSet<String>, RepositoryError>> + Send;

    /// Insert a new account.
    fn create(
        &self,
        new_user: NewUser,
    ) -> impl Future<Output = Result<User, CreateUserError>> + Send;

    /// Account plus stored password hash, for credential verification.
    ///
    /// Returns `None` when no account carries this email.
    fn find_with_password(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<(User, String)>, RepositoryError>> + Send;
}

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    username: String,
    is_active: bool,
    registered_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            username: Username::new(row.username),
            is_active: row.is_active,
            registered_at: row.registered_at,
        })
    }
}

/// Row type for credential lookups (user plus password hash).
#[derive(Debug, sqlx::FromRow)]
struct UserWithHashRow {
    id: i32,
    email: String,
    username: String,
    is_active: bool,
    registered_at: DateTime<Utc>,
    password_hash: String,
}

impl UserWithHashRow {
    fn into_parts(self) -> Result<(User, String), RepositoryError> {
        let hash = self.password_hash;
        let user = UserRow {
            id: self.id,
            email: self.email,
            username: self.username,
            is_active: self.is_active,
            registered_at: self.registered_at,
        }
        .try_into()?;
        Ok((user, hash))
    }
}

// =============================================================================
// Postgres implementation
// =============================================================================

/// `PostgreSQL`-backed user store.
pub struct PgUsers<'a> {
    pool: &'a PgPool,
}

impl<'a> PgUsers<'a> {
    /// Create a new user store over the given pool.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl UserStore for PgUsers<'_> {
    async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)",
        )
        .bind(email.as_str())
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    async fn usernames_with_prefix(&self, prefix: &str) -> Result<HashSet<String>, RepositoryError> {
        let pattern = format!("{}%", escape_like(prefix));

        let names = sqlx::query_scalar::<_, String>(
            "SELECT username FROM users WHERE username LIKE $1",
        )
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        Ok(names.into_iter().collect())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, CreateUserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (email, username, password_hash, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, username, is_active, registered_at
            ",
        )
        .bind(new_user.email.as_str())
        .bind(new_user.username.as_str())
        .bind(&new_user.password_hash)
        .bind(new_user.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return match db_err.constraint() {
                    Some(name) if name.contains("username") => CreateUserError::UsernameTaken,
                    _ => CreateUserError::EmailTaken,
                };
            }
            CreateUserError::Repository(RepositoryError::Database(e))
        })?;

        Ok(row.try_into()?)
    }

    async fn find_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithHashRow>(
            r"
            SELECT id, email, username, is_active, registered_at, password_hash
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserWithHashRow::into_parts).transpose()
    }
}

/// Escape `LIKE` metacharacters so a prefix matches literally.
fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_passes_plain_prefixes_through() {
        assert_eq!(escape_like("maria"), "maria");
    }

    #[test]
    fn escape_like_escapes_metacharacters() {
        assert_eq!(escape_like("a_b%c\\d"), "a\\_b\\%c\\\\d");
    }
}
