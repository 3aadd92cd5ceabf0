//! Authentication client.
//!
//! `AuthClient` owns the HTTP client, the session, and the email transform.
//! Issuing flows POST directly to their endpoints (no access token exists
//! yet); everything else goes through [`AuthClient::dispatch`], which attaches
//! the bearer token and renews the session on a 401 with exactly one retry.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::auth::{CredentialStore, Session, SessionTokens};
use crate::config::Config;
use crate::crypto::EmailCipher;
use crate::models::{AuthResponse, User};

use super::AuthError;

/// HTTP request timeout in seconds.
/// 30s allows for slow auth responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Caller-supplied pieces of a dispatched request. Caller headers win over
/// the fixed content-type and bearer headers on key collision.
#[derive(Debug, Default)]
pub struct RequestOptions {
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Deserialize)]
struct MeResponse {
    user: User,
}

/// Client for the authentication service.
/// Clone is cheap - reqwest::Client pools connections behind an Arc, and the
/// session shares its store the same way.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    config: Config,
    session: Session,
    cipher: Arc<dyn EmailCipher>,
}

impl AuthClient {
    /// Create a client over the given store and email transform.
    pub fn new(
        config: Config,
        store: Arc<dyn CredentialStore>,
        cipher: Arc<dyn EmailCipher>,
    ) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            config,
            session: Session::new(store),
            cipher,
        })
    }

    /// The session this client maintains. Useful for expiry checks and for
    /// reading the cached profile without a network call.
    pub fn session(&self) -> &Session {
        &self.session
    }

    // ===== Issuing flows =====
    //
    // Each flow POSTs directly to its endpoint - never through the
    // dispatcher, since no usable access token exists yet - and normalizes
    // the response to `AuthResponse` before persisting.

    /// Email/password signup.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthResponse, AuthError> {
        let email = self.cipher.encrypt(email)?;
        let body = json!({ "email": email, "password": password, "name": name });
        self.issue("signup", body, "Signup failed").await
    }

    /// Email/password login.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<AuthResponse, AuthError> {
        let email = self.cipher.encrypt(email)?;
        let body = json!({ "email": email, "password": password, "rememberMe": remember_me });
        self.issue("login", body, "Login failed").await
    }

    /// OAuth login. The provider token is opaque and passes through
    /// untouched.
    pub async fn google_login(
        &self,
        provider_token: &str,
        remember_me: bool,
    ) -> Result<AuthResponse, AuthError> {
        let body = json!({ "token": provider_token, "rememberMe": remember_me });
        self.issue("google", body, "Google login failed").await
    }

    /// Pre-shared-credential login (server-side fixed password).
    pub async fn hardcoded_login(
        &self,
        email: &str,
        remember_me: bool,
    ) -> Result<AuthResponse, AuthError> {
        let email = self.cipher.encrypt(email)?;
        let body = json!({ "email": email, "rememberMe": remember_me });
        self.issue("hardcoded-login", body, "Hardcoded login failed")
            .await
    }

    /// Shared tail of every issuing flow: POST the body, surface the
    /// server's rejection message, persist the pair, cache the profile.
    /// Logging happens here once rather than per flow.
    async fn issue(
        &self,
        endpoint: &str,
        body: serde_json::Value,
        fallback: &str,
    ) -> Result<AuthResponse, AuthError> {
        let url = self.config.endpoint(endpoint);
        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| fallback.to_string());
            warn!(endpoint, %status, message, "Issuing request rejected");
            return Err(AuthError::rejected(message));
        }

        let data: AuthResponse = response.json().await?;
        self.session.persist(&SessionTokens {
            access_token: data.token.clone(),
            refresh_token: data.refresh_token.clone(),
        });
        self.session.cache_user(&data.user);
        debug!(endpoint, user_id = %data.user.id, "Session issued");
        Ok(data)
    }

    // ===== Session maintenance =====

    /// Exchange the stored refresh token for a new pair.
    ///
    /// Returns false without a network call when no refresh token is stored.
    /// Refresh tokens are single-attempt: any rejection, transport error, or
    /// parse error clears the session and returns false. Never errors.
    pub async fn refresh(&self) -> bool {
        let Some(refresh_token) = self.session.refresh_token() else {
            debug!("No refresh token stored, skipping refresh");
            return false;
        };

        let url = self.config.endpoint("refresh");
        let body = json!({ "refreshToken": refresh_token });

        let result = async {
            let response = self.client.post(&url).json(&body).send().await?;
            if !response.status().is_success() {
                return Ok::<_, reqwest::Error>(None);
            }
            Ok(Some(response.json::<AuthResponse>().await?))
        }
        .await;

        match result {
            Ok(Some(data)) => {
                self.session.persist(&SessionTokens {
                    access_token: data.token,
                    refresh_token: data.refresh_token,
                });
                debug!("Session refreshed");
                true
            }
            Ok(None) => {
                warn!("Refresh rejected by server, clearing session");
                self.session.clear();
                false
            }
            Err(error) => {
                warn!(%error, "Refresh request failed, clearing session");
                self.session.clear();
                false
            }
        }
    }

    /// Best-effort server-side logout, then unconditional local clear.
    /// Local state is always cleared regardless of server reachability.
    pub async fn logout(&self) {
        let url = self.config.endpoint("logout");
        match self.dispatch(Method::POST, &url, RequestOptions::default()).await {
            Ok(response) if !response.status().is_success() => {
                debug!(status = %response.status(), "Logout rejected by server");
            }
            Err(error) => {
                warn!(%error, "Logout request failed, clearing session anyway");
            }
            Ok(_) => {}
        }
        self.session.clear();
    }

    /// Fetch the current user through the dispatcher, caching the profile
    /// on success. Any failure - rejection, transport, parse - yields `None`;
    /// this call backs soft session checks and must not propagate errors.
    pub async fn current_user(&self) -> Option<User> {
        let url = self.config.endpoint("me");
        let response = match self.dispatch(Method::GET, &url, RequestOptions::default()).await {
            Ok(response) => response,
            Err(error) => {
                debug!(%error, "Current user request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            debug!(status = %response.status(), "Current user rejected");
            return None;
        }

        match response.json::<MeResponse>().await {
            Ok(body) => {
                self.session.cache_user(&body.user);
                Some(body.user)
            }
            Err(error) => {
                debug!(%error, "Failed to parse current user response");
                None
            }
        }
    }

    // ===== Dispatcher =====

    /// Perform an authenticated request.
    ///
    /// Attaches the current access token as a bearer header when one exists.
    /// On a 401, refreshes the session and re-issues the request exactly once
    /// with the newly persisted token, returning whatever the second attempt
    /// produces. If the refresh fails, the original 401 response is returned
    /// unmodified. The retry is bounded at one to avoid looping against a
    /// server that keeps rejecting.
    pub async fn dispatch(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<Response, AuthError> {
        let response = self
            .send(method.clone(), url, &options, self.session.access_token())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(url, "Unauthorized response, attempting token refresh");
        if !self.refresh().await {
            warn!(url, "Token refresh failed, surfacing original response");
            return Ok(response);
        }

        self.send(method, url, &options, self.session.access_token())
            .await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        options: &RequestOptions,
        token: Option<String>,
    ) -> Result<Response, AuthError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            headers.insert(
                header::AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        // Caller headers last so they win on collision
        for (name, value) in options.headers.iter() {
            headers.insert(name, value.clone());
        }

        let mut request = self.client.request(method, url);
        if let Some(ref body) = options.body {
            request = request.json(body);
        }
        // Headers go on after the body: .json() sets its own content-type,
        // and the merged map must win
        Ok(request.headers(headers).send().await?)
    }
}
