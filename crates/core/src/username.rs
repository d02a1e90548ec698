//! Username derivation from an email address.
//!
//! Accounts log in with their email, but every account still carries a
//! unique username seeded from the email's local part. Collision handling
//! appends the smallest integer suffix that is still free: `maria`,
//! `maria1`, `maria2`, ...
//!
//! The deriver never talks to a store directly. Callers inject an
//! existence predicate, which keeps this module pure and testable. The
//! predicate only answers "is this name taken right now" - it cannot
//! reserve a name, so two concurrent derivations can pick the same
//! candidate. The store closes that race with a unique constraint at
//! commit time, and the registration flow retries on conflict.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A username assigned to an account.
///
/// Usernames are produced by [`derive_username`]; the type itself imposes
/// no character rules beyond what the derivation seeds it with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Wrap an already-derived (or database-loaded) username.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Username` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Username {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Username {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Username {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

/// Infinite iterator over username candidates for a base name.
///
/// Yields `base`, then `base1`, `base2`, ... The iterator never ends;
/// appending an ever-growing integer suffix to a bounded-length base
/// eventually reaches an unused string in any finite store.
#[derive(Debug, Clone)]
pub struct UsernameCandidates {
    base: String,
    counter: u64,
}

impl UsernameCandidates {
    /// Start a candidate sequence for the given base name.
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            counter: 0,
        }
    }
}

impl Iterator for UsernameCandidates {
    type Item = Username;

    fn next(&mut self) -> Option<Self::Item> {
        let candidate = if self.counter == 0 {
            self.base.clone()
        } else {
            format!("{}{}", self.base, self.counter)
        };
        self.counter += 1;
        Some(Username(candidate))
    }
}

/// Derive a username from an email address that is not taken according to
/// the injected predicate.
///
/// The base is the substring of `email` before the first `@`. If the base
/// is free it is returned as-is; otherwise `base1`, `base2`, ... are tried
/// in order and the first free candidate wins. The returned username
/// satisfies `exists(...) == false` as of the moment the predicate was
/// consulted.
///
/// Callers are expected to validate email format upstream; an email with
/// no `@`, or one that starts with `@`, still derives structurally (the
/// base is then the whole string or the empty string).
///
/// Checking whether the *email* is already registered is the caller's
/// concern, not this function's.
///
/// # Errors
///
/// Propagates whatever error the predicate returns.
pub fn derive_username<E, F>(email: &str, mut exists: F) -> Result<Username, E>
where
    F: FnMut(&str) -> Result<bool, E>,
{
    let base = email.split('@').next().unwrap_or(email);

    for candidate in UsernameCandidates::new(base) {
        if !exists(candidate.as_str())? {
            return Ok(candidate);
        }
    }

    unreachable!("candidate sequence is infinite")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;
    use std::convert::Infallible;

    use super::*;

    fn taken(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| (*s).to_owned()).collect()
    }

    fn derive(email: &str, set: &HashSet<String>) -> Username {
        let result: Result<Username, Infallible> =
            derive_username(email, |c| Ok(set.contains(c)));
        let Ok(username) = result;
        username
    }

    #[test]
    fn free_local_part_is_returned_verbatim() {
        let set = taken(&[]);
        assert_eq!(derive("maria@pets.com", &set).as_str(), "maria");
    }

    #[test]
    fn smallest_free_suffix_wins() {
        let set = taken(&["maria", "maria1"]);
        let username = derive("maria@pets.com", &set);
        assert_eq!(username.as_str(), "maria2");
        assert!(!set.contains(username.as_str()));
    }

    #[test]
    fn gaps_in_the_suffix_sequence_are_reused() {
        // maria1 was freed up (or never taken); it must win over maria2.
        let set = taken(&["maria", "maria2"]);
        assert_eq!(derive("maria@pets.com", &set).as_str(), "maria1");
    }

    #[test]
    fn numeric_tail_in_the_base_composes_with_the_suffix() {
        let set = taken(&["user1"]);
        assert_eq!(derive("user1@pets.com", &set).as_str(), "user11");
    }

    #[test]
    fn sequential_registrations_stay_pairwise_distinct() {
        let mut set = taken(&[]);
        let mut seen = Vec::new();
        for _ in 0..25 {
            let username = derive("maria@pets.com", &set);
            assert!(!set.contains(username.as_str()));
            set.insert(username.as_str().to_owned());
            seen.push(username);
        }
        let distinct: HashSet<&str> = seen.iter().map(Username::as_str).collect();
        assert_eq!(distinct.len(), seen.len());
        assert_eq!(seen.first().map(Username::as_str), Some("maria"));
        assert_eq!(seen.last().map(Username::as_str), Some("maria24"));
    }

    #[test]
    fn empty_local_part_derives_structurally() {
        let set = taken(&[]);
        assert_eq!(derive("@example.com", &set).as_str(), "");

        let set = taken(&[""]);
        assert_eq!(derive("@example.com", &set).as_str(), "1");

        let set = taken(&["", "1"]);
        assert_eq!(derive("@example.com", &set).as_str(), "2");
    }

    #[test]
    fn email_without_at_uses_whole_string_as_base() {
        let set = taken(&[]);
        assert_eq!(derive("no-at-sign", &set).as_str(), "no-at-sign");
    }

    #[test]
    fn predicate_errors_propagate() {
        let result = derive_username("maria@pets.com", |_| Err("store down"));
        assert_eq!(result.unwrap_err(), "store down");
    }

    #[test]
    fn candidate_sequence_starts_with_the_bare_base() {
        let mut candidates = UsernameCandidates::new("maria");
        assert_eq!(candidates.next().unwrap().as_str(), "maria");
        assert_eq!(candidates.next().unwrap().as_str(), "maria1");
        assert_eq!(candidates.next().unwrap().as_str(), "maria2");
    }

    #[test]
    fn serde_is_transparent() {
        let username = Username::new("maria2");
        let json = serde_json::to_string(&username).unwrap();
        assert_eq!(json, "\"maria2\"");
        let parsed: Username = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, username);
    }
}
