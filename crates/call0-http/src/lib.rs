//! HTTP transport for the Call0 access client
//!
//! Implements [`call0_access::Driver`] over the backend's REST endpoints
//! using `reqwest` with a cookie store, so requests carry the user's
//! session credentials.
//!
//! # Components
//!
//! - [`ApiConfig`]: base URL, session cookie, timeout
//! - [`ApiClient`]: typed calls to `creator`, `check-access`, `request-join`
//! - [`HttpDriver`]: classifies [`ApiError`]s into access outcomes

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
mod config;
mod driver;
mod error;

pub use client::ApiClient;
pub use config::{ApiConfig, DEFAULT_TIMEOUT};
pub use driver::HttpDriver;
pub use error::ApiError;
