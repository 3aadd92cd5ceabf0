//! Client configuration.
//!
//! The base URL of the authentication service is the only setting. It is
//! passed explicitly at [`crate::AuthClient`] construction; there is no
//! implicit global.

use serde::{Deserialize, Serialize};

/// Default base URL for the authentication service endpoints
const DEFAULT_BASE_URL: &str = "http://localhost:8090/api/auth";

/// Environment variable overriding the base URL
const BASE_URL_ENV: &str = "AUTH_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL all endpoint paths are joined onto, without a trailing slash
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Create a config for the given base URL. A trailing slash is stripped
    /// so endpoint joins always produce a single separator.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Read the base URL from `AUTH_API_URL`, falling back to the default.
    pub fn from_env() -> Self {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.is_empty() => Self::new(url),
            _ => Self::default(),
        }
    }

    /// Join an endpoint path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://localhost:8090/api/auth");
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let config = Config::new("https://auth.example.com/api/auth/");
        assert_eq!(config.base_url, "https://auth.example.com/api/auth");
        assert_eq!(
            config.endpoint("login"),
            "https://auth.example.com/api/auth/login"
        );
    }

    #[test]
    fn test_endpoint_join() {
        let config = Config::new("http://localhost:8090/api/auth");
        assert_eq!(config.endpoint("/refresh"), "http://localhost:8090/api/auth/refresh");
        assert_eq!(config.endpoint("me"), "http://localhost:8090/api/auth/me");
    }
}
