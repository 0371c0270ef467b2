//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the access runtime from a specific HTTP
//! stack and UI. The production implementation talks to the REST backend;
//! the simulation implementation answers from scripted responses, while the
//! generic [`crate::Runtime`] handles all orchestration.

use std::future::Future;

use crate::{
    AccessGrant, CallId, CallSession, CreatorInfo, FetchOutcome, JoinOutcome, Notification,
    UserIdentity,
};

/// Abstracts the backend and the call UI for the access runtime.
///
/// Request methods never fail: implementations classify every response
/// into an outcome and leave the policy to [`crate::AccessClient`].
///
/// The runtime clones the driver for every request so that requests can be
/// in flight concurrently. Clones must share the same backend session.
///
/// # Implementations
///
/// - **HTTP**: `reqwest` client with a cookie store
/// - **Simulation**: scripted responses with a request log
pub trait Driver: Clone + Send + Sync + 'static {
    /// `GET /calls/{call_id}/creator`.
    fn fetch_creator(
        &self,
        call_id: &CallId,
    ) -> impl Future<Output = FetchOutcome<CreatorInfo>> + Send;

    /// `GET /calls/{call_id}/check-access`.
    fn check_access(&self, call_id: &CallId)
    -> impl Future<Output = FetchOutcome<AccessGrant>> + Send;

    /// `POST /calls/{call_id}/request-join`.
    fn request_join(&self, call_id: &CallId) -> impl Future<Output = JoinOutcome> + Send;

    /// Show a transient notification.
    fn notify(&mut self, notification: &Notification);

    /// Render the session view as seen by `user`.
    fn render(&mut self, session: &CallSession, user: &UserIdentity);
}
