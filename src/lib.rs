//! sessionkit - client-side session management for a remote authentication service.
//!
//! This crate owns the session lifecycle for a JSON-over-HTTP auth server:
//! issuing flows (signup, login, OAuth, pre-shared-credential login) persist the
//! returned token pair, authenticated requests carry the access token as a
//! bearer header, and an expired session is renewed transparently with a single
//! bounded retry.
//!
//! The server, the email-obscuring transform, and the durable credential store
//! are all external collaborators: the server is a black-box contract, the
//! transform is the [`crypto::EmailCipher`] trait, and storage is the
//! [`auth::CredentialStore`] trait.

pub mod api;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod models;

pub use api::{AuthClient, AuthError, RequestOptions};
pub use auth::{CredentialStore, FileStore, KeyringStore, MemoryStore, Session, SessionTokens};
pub use config::Config;
pub use crypto::{EmailCipher, PassphraseCipher, PlainCipher};
pub use models::{AuthResponse, User};
