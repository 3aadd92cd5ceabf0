//! HTTP client module for the authentication service.
//!
//! This module provides the `AuthClient` for the five issuing flows,
//! session maintenance (refresh, logout, current user), and the
//! authenticated request dispatcher with its single-retry renewal policy.

pub mod client;
pub mod error;

pub use client::{AuthClient, RequestOptions};
pub use error::AuthError;
