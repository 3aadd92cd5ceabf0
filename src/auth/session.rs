//! Session token lifecycle.
//!
//! A session is an access/refresh token pair plus a cached user profile,
//! held in three fixed slots of a [`CredentialStore`]. The store is consulted
//! on every read rather than cached in memory, so overlapping refreshes
//! resolve as last-write-wins and a restarted process picks up where it
//! left off.
//!
//! Expiry inspection decodes the access token's payload segment without any
//! signature check - cryptographic validation is the server's job.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::store::CredentialStore;
use crate::models::User;

/// Store slot for the access token.
/// These key names are stable across versions; changing them would log out
/// every existing installation.
pub const ACCESS_TOKEN_KEY: &str = "auth_token";

/// Store slot for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Store slot for the serialized user profile
pub const USER_KEY: &str = "user_data";

/// Access/refresh token pair. Both present or both absent in storage:
/// [`Session::persist`] writes both, [`Session::clear`] removes both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Token pair lifecycle over a credential store.
/// Clone is cheap - the store is shared behind an Arc.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn CredentialStore>,
}

impl Session {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Current access token, if one is stored.
    pub fn access_token(&self) -> Option<String> {
        self.store.get(ACCESS_TOKEN_KEY)
    }

    /// Current refresh token, if one is stored.
    pub fn refresh_token(&self) -> Option<String> {
        self.store.get(REFRESH_TOKEN_KEY)
    }

    /// Write both tokens to the store.
    /// The writes are sequential with no rollback; the pair goes in before
    /// any profile write so an interruption leaves a re-loginable state.
    pub fn persist(&self, tokens: &SessionTokens) {
        self.store.set(ACCESS_TOKEN_KEY, &tokens.access_token);
        self.store.set(REFRESH_TOKEN_KEY, &tokens.refresh_token);
    }

    /// Cache the user profile alongside the session. The profile is
    /// cache-only and refetchable, so serialization failures are logged
    /// and dropped.
    pub fn cache_user(&self, user: &User) {
        match serde_json::to_string(user) {
            Ok(serialized) => self.store.set(USER_KEY, &serialized),
            Err(error) => warn!(%error, "Failed to serialize user profile"),
        }
    }

    /// Cached user profile, if present and parseable.
    pub fn user(&self) -> Option<User> {
        let serialized = self.store.get(USER_KEY)?;
        match serde_json::from_str(&serialized) {
            Ok(user) => Some(user),
            Err(error) => {
                warn!(%error, "Discarding unparseable cached user profile");
                None
            }
        }
    }

    /// Remove the token pair and cached profile. Idempotent.
    pub fn clear(&self) {
        self.store.remove(ACCESS_TOKEN_KEY);
        self.store.remove(REFRESH_TOKEN_KEY);
        self.store.remove(USER_KEY);
    }

    /// Check whether a stored access token exists and has not expired.
    ///
    /// Decodes the token's payload segment and compares the `exp` claim
    /// (seconds since epoch) against the current time. Returns false for an
    /// absent token, a malformed token, or a past expiry; never errors.
    pub fn is_valid(&self) -> bool {
        let Some(token) = self.access_token() else {
            return false;
        };
        match decode_expiry(&token) {
            Some(expires_at) => Utc::now() < expires_at,
            None => {
                debug!("Access token payload undecodable, treating session as invalid");
                false
            }
        }
    }
}

/// Extract the `exp` claim from a JWT-shaped token without verifying the
/// signature. The payload segment is base64url without padding.
fn decode_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?.as_i64()?;
    Utc.timestamp_opt(exp, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryStore;

    /// Build a JWT-shaped token with the given exp claim. The header and
    /// signature segments are ignored by expiry inspection.
    fn token_expiring_at(exp: i64) -> String {
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"1","exp":{}}}"#, exp));
        format!("eyJhbGciOiJIUzI1NiJ9.{}.sig", payload)
    }

    fn session() -> Session {
        Session::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_persist_writes_both_tokens() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::new(store.clone());

        session.persist(&SessionTokens {
            access_token: "T1".into(),
            refresh_token: "R1".into(),
        });

        assert_eq!(store.get(ACCESS_TOKEN_KEY).as_deref(), Some("T1"));
        assert_eq!(store.get(REFRESH_TOKEN_KEY).as_deref(), Some("R1"));
        assert_eq!(session.access_token().as_deref(), Some("T1"));
        assert_eq!(session.refresh_token().as_deref(), Some("R1"));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let session = session();
        session.persist(&SessionTokens {
            access_token: "T1".into(),
            refresh_token: "R1".into(),
        });
        session.cache_user(&User {
            id: "1".into(),
            email: "a@b.com".into(),
            name: "A".into(),
        });

        session.clear();
        assert_eq!(session.access_token(), None);
        assert_eq!(session.refresh_token(), None);
        assert_eq!(session.user(), None);

        session.clear();
        assert_eq!(session.access_token(), None);
    }

    #[test]
    fn test_user_cache_roundtrip() {
        let session = session();
        let user = User {
            id: "1".into(),
            email: "a@b.com".into(),
            name: "A".into(),
        };
        session.cache_user(&user);
        assert_eq!(session.user(), Some(user));
    }

    #[test]
    fn test_is_valid_absent_token() {
        assert!(!session().is_valid());
    }

    #[test]
    fn test_is_valid_malformed_tokens() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::new(store.clone());

        for bad in ["garbage", "one.two", "a.!!!notbase64!!!.c", "a..c"] {
            store.set(ACCESS_TOKEN_KEY, bad);
            assert!(!session.is_valid(), "token {:?} should be invalid", bad);
        }

        // Valid base64 payload but no exp claim
        let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"1"}"#);
        store.set(ACCESS_TOKEN_KEY, &format!("h.{}.s", payload));
        assert!(!session.is_valid());
    }

    #[test]
    fn test_is_valid_expired_token() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::new(store.clone());
        let past = Utc::now().timestamp() - 60;
        store.set(ACCESS_TOKEN_KEY, &token_expiring_at(past));
        assert!(!session.is_valid());
    }

    #[test]
    fn test_is_valid_future_token() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::new(store.clone());
        let future = Utc::now().timestamp() + 3600;
        store.set(ACCESS_TOKEN_KEY, &token_expiring_at(future));
        assert!(session.is_valid());
    }
}
