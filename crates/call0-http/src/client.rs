//! Typed client for the call access endpoints.
//!
//! | Method | Path | Success body |
//! |---|---|---|
//! | GET | `calls/{id}/creator` | `{ "creator": { id, name, email, image } }` |
//! | GET | `calls/{id}/check-access` | `{ "hasAccess": bool, "isCreator": bool }` |
//! | POST | `calls/{id}/request-join` | `{}` |
//!
//! Failures carry `{ "error": string }`. Every request goes through a cookie
//! store so the backend sees the user's session.

use std::sync::Arc;

use call0_access::{AccessGrant, CallId, CreatorInfo};
use reqwest::{Url, cookie::Jar};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{ApiConfig, ApiError};

/// `GET creator` response.
#[derive(Debug, Deserialize)]
struct CreatorEnvelope {
    creator: CreatorInfo,
}

/// Failure body.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Client for the three access endpoints of one backend.
///
/// Cheap to clone; clones share the connection pool and cookie store.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Build a client from configuration.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let jar = Arc::new(Jar::default());
        if let Some(cookie) = &config.session_cookie {
            jar.add_cookie_str(cookie, &config.base_url);
        }

        let http = reqwest::Client::builder()
            .cookie_provider(jar)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base_url: config.base_url.clone() })
    }

    /// API root.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch the creator of a call.
    pub async fn creator(&self, call_id: &CallId) -> Result<CreatorInfo, ApiError> {
        let url = self.endpoint(call_id, "creator")?;
        let resp = self.http.get(url).send().await?;
        let envelope: CreatorEnvelope = Self::parse(resp).await?;
        Ok(envelope.creator)
    }

    /// Check whether the session user may enter a call.
    pub async fn check_access(&self, call_id: &CallId) -> Result<AccessGrant, ApiError> {
        let url = self.endpoint(call_id, "check-access")?;
        let resp = self.http.get(url).send().await?;
        Self::parse(resp).await
    }

    /// Ask the call's host for approval.
    pub async fn request_join(&self, call_id: &CallId) -> Result<(), ApiError> {
        let url = self.endpoint(call_id, "request-join")?;
        let resp = self.http.post(url).json(&serde_json::json!({})).send().await?;
        if resp.status().is_success() {
            return Ok(());
        }
        Err(Self::error_from(resp).await)
    }

    /// `{base}/calls/{call_id}/{action}` with the call id percent-encoded as
    /// a single path segment.
    fn endpoint(&self, call_id: &CallId, action: &str) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| ApiError::Config(format!("cannot extend base URL {}", self.base_url)))?;
            segments.pop_if_empty().extend(["calls", call_id.as_str(), action]);
        }
        Ok(url)
    }

    async fn parse<R: DeserializeOwned>(resp: reqwest::Response) -> Result<R, ApiError> {
        if !resp.status().is_success() {
            return Err(Self::error_from(resp).await);
        }
        resp.json::<R>().await.map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn error_from(resp: reqwest::Response) -> ApiError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body).unwrap_or_default().error;

        if status == 404 { ApiError::NotFound { message } } else { ApiError::Server { status, message } }
    }
}
