//! Authentication module for managing user sessions and credentials.
//!
//! This module provides:
//! - `Session`: token pair lifecycle with expiry inspection
//! - `CredentialStore`: durable key-value storage behind a trait seam,
//!   with file, OS-keychain, and in-memory backends
//!
//! The store is the source of truth; every session read consults it, so the
//! last write wins across overlapping refreshes.

pub mod session;
pub mod store;

pub use session::{Session, SessionTokens};
pub use store::{CredentialStore, FileStore, KeyringStore, MemoryStore};
