//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` answers the three access endpoints from a script instead of
//! a network, and records every request, notification, and render. It
//! implements [`Driver`] so the same [`call0_access::Runtime`] orchestration
//! code runs in both production and simulation.
//!
//! Latency is simulated with `tokio::time::sleep`, so tests running on a
//! paused clock are fully deterministic.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use call0_access::{
    AccessGrant, CallId, CallSession, CreatorInfo, Driver, FetchOutcome, JoinOutcome, Notification,
    UserIdentity,
};
use tokio::time::Instant;

use crate::invariants::{InvariantRegistry, SessionSnapshot, Violation};

/// Endpoint hit by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// `GET creator`.
    Creator,
    /// `GET check-access`.
    CheckAccess,
    /// `POST request-join`.
    RequestJoin,
}

/// A request observed by the simulated backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Endpoint.
    pub kind: RequestKind,
    /// Call the request was for.
    pub call_id: CallId,
    /// Virtual time the request was issued.
    pub at: Instant,
}

/// Scripted responses. A queue keeps answering with its last entry once
/// the others are used up.
#[derive(Default)]
struct Script {
    creators: HashMap<CallId, FetchOutcome<CreatorInfo>>,
    access: HashMap<CallId, VecDeque<FetchOutcome<AccessGrant>>>,
    joins: HashMap<CallId, VecDeque<JoinOutcome>>,
    latency: HashMap<(RequestKind, CallId), Duration>,
}

/// Pop the next scripted response, keeping the last one sticky.
fn next_sticky<T: Clone>(queue: Option<&mut VecDeque<T>>) -> Option<T> {
    let queue = queue?;
    if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() }
}

/// Shared state between driver clones.
#[derive(Default)]
struct SharedState {
    script: Script,
    requests: Vec<RecordedRequest>,
    notifications: Vec<Notification>,
    renders: Vec<CallSession>,
    violations: Vec<Violation>,
}

/// Simulation driver for deterministic testing.
///
/// Clones share the script and the recordings, matching the runtime's
/// clone-per-request usage.
#[derive(Clone, Default)]
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
    invariants: Option<Arc<InvariantRegistry>>,
}

impl SimDriver {
    /// Create a driver whose backend knows no calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check invariants on every render, against the identity the runtime
    /// renders for.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(Arc::new(registry));
        self
    }

    /// Script the creator response for a call.
    #[must_use]
    pub fn with_creator(self, call_id: &CallId, outcome: FetchOutcome<CreatorInfo>) -> Self {
        self.lock().script.creators.insert(call_id.clone(), outcome);
        self
    }

    /// Script successive check-access responses for a call.
    #[must_use]
    pub fn with_access(
        self,
        call_id: &CallId,
        outcomes: impl IntoIterator<Item = FetchOutcome<AccessGrant>>,
    ) -> Self {
        self.lock().script.access.insert(call_id.clone(), outcomes.into_iter().collect());
        self
    }

    /// Script successive request-join responses for a call.
    #[must_use]
    pub fn with_join(self, call_id: &CallId, outcomes: impl IntoIterator<Item = JoinOutcome>) -> Self {
        self.lock().script.joins.insert(call_id.clone(), outcomes.into_iter().collect());
        self
    }

    /// Delay responses of one endpoint for one call.
    #[must_use]
    pub fn with_latency(self, kind: RequestKind, call_id: &CallId, latency: Duration) -> Self {
        self.lock().script.latency.insert((kind, call_id.clone()), latency);
        self
    }

    /// Replace the check-access script of a call mid-run.
    pub fn set_access(&self, call_id: &CallId, outcomes: impl IntoIterator<Item = FetchOutcome<AccessGrant>>) {
        self.lock().script.access.insert(call_id.clone(), outcomes.into_iter().collect());
    }

    /// All requests in issue order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Number of requests of `kind` issued for `call_id`.
    pub fn count(&self, kind: RequestKind, call_id: &CallId) -> usize {
        self.lock().requests.iter().filter(|r| r.kind == kind && &r.call_id == call_id).count()
    }

    /// All notifications shown.
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }

    /// Every rendered session, oldest first.
    pub fn renders(&self) -> Vec<CallSession> {
        self.lock().renders.clone()
    }

    /// Invariant violations observed on render.
    pub fn violations(&self) -> Vec<Violation> {
        self.lock().violations.clone()
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a request and pick its scripted response.
    fn record<T>(
        &self,
        kind: RequestKind,
        call_id: &CallId,
        pick: impl FnOnce(&mut Script) -> T,
    ) -> (T, Option<Duration>) {
        let mut state = self.lock();
        state.requests.push(RecordedRequest { kind, call_id: call_id.clone(), at: Instant::now() });
        let latency = state.script.latency.get(&(kind, call_id.clone())).copied();
        (pick(&mut state.script), latency)
    }
}

async fn delay(latency: Option<Duration>) {
    if let Some(latency) = latency {
        tokio::time::sleep(latency).await;
    }
}

impl Driver for SimDriver {
    async fn fetch_creator(&self, call_id: &CallId) -> FetchOutcome<CreatorInfo> {
        let (outcome, latency) = self.record(RequestKind::Creator, call_id, |script| {
            script.creators.get(call_id).cloned().unwrap_or(FetchOutcome::NotFound)
        });
        delay(latency).await;
        outcome
    }

    async fn check_access(&self, call_id: &CallId) -> FetchOutcome<AccessGrant> {
        let (outcome, latency) = self.record(RequestKind::CheckAccess, call_id, |script| {
            next_sticky(script.access.get_mut(call_id)).unwrap_or(FetchOutcome::NotFound)
        });
        delay(latency).await;
        outcome
    }

    async fn request_join(&self, call_id: &CallId) -> JoinOutcome {
        let (outcome, latency) = self.record(RequestKind::RequestJoin, call_id, |script| {
            next_sticky(script.joins.get_mut(call_id)).unwrap_or(JoinOutcome::Rejected {
                status: 404,
                message: Some("Call not found".into()),
            })
        });
        delay(latency).await;
        outcome
    }

    fn notify(&mut self, notification: &Notification) {
        tracing::debug!(?notification, "sim notify");
        self.lock().notifications.push(notification.clone());
    }

    fn render(&mut self, session: &CallSession, user: &UserIdentity) {
        let violations = self.invariants.as_deref().and_then(|registry| {
            registry.check_all(&SessionSnapshot::new(user.clone(), session.clone())).err()
        });

        let mut state = self.lock();
        state.renders.push(session.clone());
        if let Some(violations) = violations {
            for violation in &violations {
                tracing::error!(%violation, "invariant violated");
            }
            state.violations.extend(violations);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(id: &str) -> CallId {
        CallId::parse(id).expect("valid call id")
    }

    #[test]
    fn last_scripted_response_is_sticky() {
        let mut queue: VecDeque<u8> = [1, 2].into_iter().collect();
        assert_eq!(next_sticky(Some(&mut queue)), Some(1));
        assert_eq!(next_sticky(Some(&mut queue)), Some(2));
        assert_eq!(next_sticky(Some(&mut queue)), Some(2));
        assert_eq!(next_sticky::<u8>(None), None);
    }

    #[tokio::test]
    async fn unknown_calls_are_not_found() {
        let driver = SimDriver::new();
        assert_eq!(driver.fetch_creator(&call("nope")).await, FetchOutcome::NotFound);
        assert_eq!(driver.check_access(&call("nope")).await, FetchOutcome::NotFound);
        assert_eq!(driver.requests().len(), 2);
    }

    #[tokio::test]
    async fn clones_share_recordings() {
        let driver = SimDriver::new();
        let clone = driver.clone();
        let _ = clone.request_join(&call("abc")).await;

        assert_eq!(driver.count(RequestKind::RequestJoin, &call("abc")), 1);
    }
}
