//! HTTP client configuration.

use std::time::Duration;

use reqwest::Url;

use crate::ApiError;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the access endpoints.
///
/// The base URL is process-wide configuration read once at startup and
/// passed explicitly into [`crate::ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// API root, e.g. `https://api.call0.app`. Always ends with `/`.
    pub base_url: Url,
    /// Initial session cookie (`name=value`) seeded into the cookie store.
    pub session_cookie: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ApiConfig {
    /// Parse and normalise the base URL.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(ApiError::Config("API base URL is empty".into()));
        }

        let mut url = Url::parse(trimmed)
            .map_err(|e| ApiError::Config(format!("invalid API base URL {trimmed:?}: {e}")))?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!("API base URL must be http(s): {trimmed:?}")));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self { base_url: url, session_cookie: None, timeout: DEFAULT_TIMEOUT })
    }

    /// Seed a session cookie.
    #[must_use]
    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
