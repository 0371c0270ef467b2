//! Production [`Driver`] over the REST backend.
//!
//! Requests go through [`ApiClient`]; errors are classified into outcomes
//! for the state machine. The UI side of the driver is logging: each
//! notification and session change is emitted as a `tracing` event, and
//! session snapshots are also available from [`call0_access::RuntimeHandle`].

use call0_access::{
    AccessGrant, CallId, CallSession, CreatorInfo, Driver, FetchOutcome, JoinOutcome, Notification,
    NotificationLevel, UserIdentity,
};

use crate::{ApiClient, ApiError};

/// Driver that talks to the Call0 REST backend.
#[derive(Debug, Clone)]
pub struct HttpDriver {
    api: ApiClient,
}

impl HttpDriver {
    /// Wrap an API client.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

/// Classify a probe result.
fn fetch_outcome<T>(result: Result<T, ApiError>) -> FetchOutcome<T> {
    match result {
        Ok(value) => FetchOutcome::Ok(value),
        Err(ApiError::NotFound { .. }) => FetchOutcome::NotFound,
        Err(err) => FetchOutcome::Failed(err.to_string()),
    }
}

/// Classify a join request result.
fn join_outcome(result: Result<(), ApiError>) -> JoinOutcome {
    match result {
        Ok(()) => JoinOutcome::Requested,
        Err(ApiError::NotFound { message }) => JoinOutcome::Rejected { status: 404, message },
        Err(ApiError::Server { status, message }) => JoinOutcome::Rejected { status, message },
        Err(err) => JoinOutcome::Failed(err.to_string()),
    }
}

impl Driver for HttpDriver {
    async fn fetch_creator(&self, call_id: &CallId) -> FetchOutcome<CreatorInfo> {
        fetch_outcome(self.api.creator(call_id).await)
    }

    async fn check_access(&self, call_id: &CallId) -> FetchOutcome<AccessGrant> {
        fetch_outcome(self.api.check_access(call_id).await)
    }

    async fn request_join(&self, call_id: &CallId) -> JoinOutcome {
        join_outcome(self.api.request_join(call_id).await)
    }

    fn notify(&mut self, notification: &Notification) {
        match notification.level {
            NotificationLevel::Info | NotificationLevel::Success => {
                tracing::info!(level = ?notification.level, "{}", notification.text);
            },
            NotificationLevel::Error => tracing::warn!("{}", notification.text),
        }
    }

    fn render(&mut self, session: &CallSession, user: &UserIdentity) {
        tracing::info!(
            call_id = ?session.call_id.as_ref().map(CallId::as_str),
            ?user,
            status = ?session.status(),
            can_enter = session.can_enter(),
            has_access = ?session.has_access,
            is_creator = session.is_creator,
            requesting = session.is_requesting_access,
            creator = ?session.creator_info.as_ref().map(|c| c.id.as_str()),
            "call session updated"
        );
    }
}
