//! Results of backend requests, classified by HTTP status.
//!
//! Transports never hand errors to the state machine. They classify every
//! response into one of these outcomes and the machine decides the policy.

/// Result of a read probe (`creator` or `check-access`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    /// `200` with a decoded body.
    Ok(T),
    /// `404`: the backend has no record of the call.
    NotFound,
    /// Network error, undecodable body, or any other status.
    Failed(String),
}

/// Result of a `request-join` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// `200`: the host has been asked.
    Requested,
    /// Non-2xx response.
    Rejected {
        /// HTTP status code.
        status: u16,
        /// `error` field of the response body, if any.
        message: Option<String>,
    },
    /// The request never produced a response.
    Failed(String),
}
