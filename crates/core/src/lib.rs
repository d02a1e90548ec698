//! Huellitas Core - Shared types library.
//!
//! This crate provides the common types used across the Huellitas Alegres
//! components:
//! - `web` - Store site (catalog pages + authentication)
//! - `cli` - Command-line tools for migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. The one algorithm that lives here is the username
//! deriver in [`username`]: everything it needs from the outside world comes
//! in through an injected predicate, so it can be tested without a store.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails
//! - [`username`] - Username derivation from an email's local part

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod username;

pub use types::*;
pub use username::{Username, UsernameCandidates, derive_username};
