//! Client-side API errors.

use thiserror::Error;

/// Errors returned by [`crate::ApiClient`].
///
/// Classification is purely by HTTP status; the backend has no structured
/// error code scheme.
#[derive(Debug, Error)]
pub enum ApiError {
    /// `404`: the backend has no record of the call.
    #[error("not found")]
    NotFound {
        /// `error` field of the response body, if any.
        message: Option<String>,
    },

    /// Any other non-2xx status.
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Server {
        /// HTTP status code.
        status: u16,
        /// `error` field of the response body, if any.
        message: Option<String>,
    },

    /// The request never produced a response.
    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body did not match the expected shape.
    #[error("decode: {0}")]
    Decode(String),

    /// Invalid client configuration (base URL, cookie).
    #[error("configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status carried by this error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Server { status, .. } => Some(*status),
            Self::Network(_) | Self::Decode(_) | Self::Config(_) => None,
        }
    }
}
