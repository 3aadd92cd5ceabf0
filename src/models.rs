//! Wire types shared by the authentication endpoints.

use serde::{Deserialize, Serialize};

/// User profile returned by the server. Opaque passthrough value - cached
/// alongside the session, refetchable, never validated locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// Canonical response shape of every issuing endpoint
/// (signup, login, google, hardcoded-login, refresh).
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: String,
    pub token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    pub user: User,
}
