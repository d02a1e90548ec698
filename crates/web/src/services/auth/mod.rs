//! Authentication service.
//!
//! Registration, login and password hashing. The service is generic over
//! [`UserStore`] so it runs against the `PostgreSQL` store in production
//! and an in-memory double in tests.
//!
//! Registration derives the account's username from the email's local
//! part against a snapshot of taken names. The snapshot can go stale
//! between derivation and commit; the store's unique constraint rejects
//! the duplicate at commit time and the service re-derives against a
//! fresh snapshot, a bounded number of times.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use huellitas_core::{Email, derive_username};

use crate::db::users::{CreateUserError, UserStore};
use crate::models::user::{NewUser, User};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// How many times a lost username race is retried before giving up.
const MAX_USERNAME_RETRIES: usize = 3;

/// Authentication service.
///
/// Handles account registration and credential verification.
pub struct AuthService<S> {
    users: S,
}

impl<S: UserStore> AuthService<S> {
    /// Create a new authentication service over the given store.
    #[must_use]
    pub const fn new(users: S) -> Self {
        Self { users }
    }

    /// Register a new account with email and password.
    ///
    /// The username is derived from the email's local part with the
    /// smallest free integer suffix.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::EmailTaken` if the email is already registered.
    /// Returns `AuthError::UsernameUnavailable` if every retry lost the
    /// derivation race.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        if self.users.email_exists(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(password)?;

        for attempt in 0..MAX_USERNAME_RETRIES {
            let taken = self
                .users
                .usernames_with_prefix(email.local_part())
                .await?;
            let username = derive_username(email.as_str(), |candidate| {
                Ok::<_, AuthError>(taken.contains(candidate))
            })?;

            match self
                .users
                .create(NewUser {
                    email: email.clone(),
                    username,
                    password_hash: password_hash.clone(),
                    is_active: true,
                })
                .await
            {
                Ok(user) => return Ok(user),
                Err(CreateUserError::UsernameTaken) => {
                    // Lost the race between snapshot and commit; re-derive.
                    tracing::debug!(email = %email, attempt, "username conflict, retrying");
                }
                Err(CreateUserError::EmailTaken) => return Err(AuthError::EmailTaken),
                Err(CreateUserError::Repository(e)) => return Err(e.into()),
            }
        }

        Err(AuthError::UsernameUnavailable)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is
    /// wrong (malformed emails are folded into the same error so the
    /// response does not reveal which part failed).
    /// Returns `AuthError::Inactive` for a deactivated account.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .find_with_password(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !user.is_active {
            return Err(AuthError::Inactive);
        }

        Ok(user)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use chrono::Utc;
    use huellitas_core::UserId;

    use super::*;
    use crate::db::RepositoryError;

    /// In-memory user store. Uniqueness of email and username is enforced
    /// inside `create`, like the database's commit-time constraints.
    #[derive(Default)]
    struct MemoryUsers {
        rows: Mutex<Vec<(User, String)>>,
        next_id: Mutex<i32>,
        serve_stale_snapshot: AtomicBool,
    }

    impl MemoryUsers {
        fn new() -> Self {
            Self::default()
        }

        /// Make the next `usernames_with_prefix` call pretend nothing is
        /// taken, simulating a snapshot that went stale before commit.
        fn serve_stale_snapshot_once(&self) {
            self.serve_stale_snapshot.store(true, Ordering::SeqCst);
        }

        fn usernames(&self) -> Vec<String> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .map(|(u, _)| u.username.as_str().to_owned())
                .collect()
        }
    }

    impl UserStore for MemoryUsers {
        async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().any(|(u, _)| u.email == *email))
        }

        async fn usernames_with_prefix(
            &self,
            prefix: &str,
        ) -> Result<HashSet<String>, RepositoryError> {
            if self.serve_stale_snapshot.swap(false, Ordering::SeqCst) {
                return Ok(HashSet::new());
            }

            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .map(|(u, _)| u.username.as_str())
                .filter(|name| name.starts_with(prefix))
                .map(ToOwned::to_owned)
                .collect())
        }

        async fn create(&self, new_user: NewUser) -> Result<User, CreateUserError> {
            let mut rows = self.rows.lock().unwrap();

            if rows.iter().any(|(u, _)| u.email == new_user.email) {
                return Err(CreateUserError::EmailTaken);
            }
            if rows.iter().any(|(u, _)| u.username == new_user.username) {
                return Err(CreateUserError::UsernameTaken);
            }

            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;

            let user = User {
                id: UserId::new(*next_id),
                email: new_user.email,
                username: new_user.username,
                is_active: new_user.is_active,
                registered_at: Utc::now(),
            };
            rows.push((user.clone(), new_user.password_hash));

            Ok(user)
        }

        async fn find_with_password(
            &self,
            email: &Email,
        ) -> Result<Option<(User, String)>, RepositoryError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .find(|(u, _)| u.email == *email)
                .map(|(u, hash)| (u.clone(), hash.clone())))
        }
    }

    #[tokio::test]
    async fn register_uses_the_free_local_part() {
        let auth = AuthService::new(MemoryUsers::new());

        let user = auth.register("maria@pets.com", "secreta").await.unwrap();

        assert_eq!(user.username.as_str(), "maria");
        assert!(user.is_active);
    }

    #[tokio::test]
    async fn register_rejects_a_duplicate_email() {
        let auth = AuthService::new(MemoryUsers::new());
        auth.register("maria@pets.com", "secreta").await.unwrap();

        let err = auth.register("maria@pets.com", "otraclave").await.unwrap_err();

        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn register_appends_the_smallest_free_suffix() {
        let auth = AuthService::new(MemoryUsers::new());
        // Same local part under different domains: maria, maria1 get taken.
        auth.register("maria@pets.com", "secreta").await.unwrap();
        auth.register("maria@vet.com", "secreta").await.unwrap();

        let user = auth.register("maria@clinica.co", "secreta").await.unwrap();

        assert_eq!(user.username.as_str(), "maria2");
    }

    #[tokio::test]
    async fn register_rejects_short_passwords() {
        let auth = AuthService::new(MemoryUsers::new());

        let err = auth.register("maria@pets.com", "corta").await.unwrap_err();

        assert!(matches!(err, AuthError::WeakPassword(_)));
    }

    #[tokio::test]
    async fn register_rejects_malformed_emails() {
        let auth = AuthService::new(MemoryUsers::new());

        let err = auth.register("sin-arroba", "secreta").await.unwrap_err();

        assert!(matches!(err, AuthError::InvalidEmail(_)));
    }

    #[tokio::test]
    async fn stale_snapshot_is_caught_at_commit_and_retried() {
        // Regression test for the derivation race: a second registration
        // observing a stale snapshot must not end up with a duplicate
        // username. The store rejects the duplicate at commit time and
        // the service re-derives.
        let store = MemoryUsers::new();
        let auth = AuthService::new(store);
        auth.register("maria@pets.com", "secreta").await.unwrap();

        auth.users.serve_stale_snapshot_once();
        let user = auth.register("maria@vet.com", "secreta").await.unwrap();

        assert_eq!(user.username.as_str(), "maria1");
        let names = auth.users.usernames();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"maria".to_owned()));
    }

    #[tokio::test]
    async fn concurrent_registrations_get_distinct_usernames() {
        let auth = AuthService::new(MemoryUsers::new());

        let (a, b) = tokio::join!(
            auth.register("maria@pets.com", "secreta"),
            auth.register("maria@vet.com", "secreta"),
        );

        let a = a.unwrap();
        let b = b.unwrap();
        assert_ne!(a.username, b.username);
    }

    #[tokio::test]
    async fn login_verifies_the_stored_hash() {
        let auth = AuthService::new(MemoryUsers::new());
        auth.register("maria@pets.com", "secreta").await.unwrap();

        let user = auth.login("maria@pets.com", "secreta").await.unwrap();
        assert_eq!(user.email.as_str(), "maria@pets.com");

        let err = auth.login("maria@pets.com", "equivocada").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_does_not_reveal_whether_the_account_exists() {
        let auth = AuthService::new(MemoryUsers::new());

        let err = auth.login("nadie@pets.com", "secreta").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let err = auth.login("no-es-un-email", "secreta").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_rejects_deactivated_accounts() {
        let store = MemoryUsers::new();
        let hash = hash_password("secreta").unwrap();
        store
            .create(NewUser {
                email: Email::parse("maria@pets.com").unwrap(),
                username: huellitas_core::Username::new("maria"),
                password_hash: hash,
                is_active: false,
            })
            .await
            .unwrap();

        let auth = AuthService::new(store);
        let err = auth.login("maria@pets.com", "secreta").await.unwrap_err();

        assert!(matches!(err, AuthError::Inactive));
    }

    #[test]
    fn password_hashing_round_trips() {
        let hash = hash_password("secreta").unwrap();
        assert!(verify_password("secreta", &hash).is_ok());
        assert!(verify_password("otra", &hash).is_err());
    }
}
