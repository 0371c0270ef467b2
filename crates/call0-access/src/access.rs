//! Call access state machine.
//!
//! This module defines the [`AccessClient`] state machine, which reconciles
//! the local [`CallSession`] with the backend's view of who may enter a call,
//! completely decoupled from HTTP and timers.
//!
//! This is a pure state machine: it consumes [`AccessEvent`] inputs and
//! produces [`AccessAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Fetches the call creator once per call id.
//! - Polls access status while the user has not joined, except for guests
//!   who are granted access locally.
//! - Maps `404` from either probe onto the anonymous-room policy.
//! - Runs the user-triggered join request and its notifications.
//!
//! # Generations
//!
//! Every request action carries the current session generation. The
//! generation is bumped whenever the session is reset (call change, unmount,
//! identity change), so completions that arrive after a reset are dropped.
//! Completions within one generation are applied in arrival order with no
//! reordering guard: each field is last-write-wins.

use crate::{
    AccessAction, AccessConfig, AccessEvent, AccessGrant, CallId, CallSession, CreatorInfo,
    FetchOutcome, JoinOutcome, Notification, UserIdentity,
};

/// Notification text when the host has been asked for access.
pub const REQUEST_SENT_TEXT: &str = "Access request sent. Waiting for the host to approve.";

/// Notification text when a join request fails without a server message.
pub const REQUEST_FAILED_TEXT: &str = "Failed to request access";

/// Notification text when a guest asks for access.
pub const GUEST_REQUEST_TEXT: &str = "Guests already have access to this call";

/// Call access state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct AccessClient {
    /// View model of the current call.
    session: CallSession,
    /// Local user.
    user: UserIdentity,
    /// Polling configuration.
    config: AccessConfig,
    /// Bumped on every session reset.
    generation: u64,
    /// Polling timer is armed.
    polling: bool,
}

impl AccessClient {
    /// Create a client for the given user with no call mounted.
    pub fn new(user: UserIdentity, config: AccessConfig) -> Self {
        Self { session: CallSession::default(), user, config, generation: 0, polling: false }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AccessEvent) -> Vec<AccessAction> {
        match event {
            AccessEvent::CallChanged { call_id } => {
                if call_id == self.session.call_id {
                    return vec![];
                }
                self.reset(call_id)
            },
            AccessEvent::JoinedChanged { joined } => {
                if joined == self.session.joined {
                    return vec![];
                }
                self.session.joined = joined;
                let mut actions = Vec::new();
                self.reconcile_polling(&mut actions);
                actions.push(AccessAction::Render);
                actions
            },
            AccessEvent::UserChanged { user } => {
                if user == self.user {
                    return vec![];
                }
                self.user = user;
                let call_id = self.session.call_id.clone();
                self.reset(call_id)
            },
            AccessEvent::PollTick => self.poll_tick(),
            AccessEvent::RequestAccess => self.request_access(),
            AccessEvent::CreatorFetched { generation, outcome } => {
                if self.is_stale(generation, "creator") {
                    return vec![];
                }
                self.apply_creator(outcome)
            },
            AccessEvent::AccessChecked { generation, outcome } => {
                if self.is_stale(generation, "check-access") {
                    return vec![];
                }
                self.apply_access(outcome)
            },
            AccessEvent::JoinRequestCompleted { generation, outcome } => {
                if self.is_stale(generation, "request-join") {
                    return vec![];
                }
                self.apply_join_request(outcome)
            },
        }
    }

    /// Mount, switch, or unmount (`None`) a call.
    pub fn set_call(&mut self, call_id: Option<CallId>) -> Vec<AccessAction> {
        self.handle(AccessEvent::CallChanged { call_id })
    }

    /// Update the external `joined` flag.
    pub fn set_joined(&mut self, joined: bool) -> Vec<AccessAction> {
        self.handle(AccessEvent::JoinedChanged { joined })
    }

    /// Ask the call's host for access.
    pub fn request_access(&mut self) -> Vec<AccessAction> {
        if self.user.is_guest() {
            return vec![AccessAction::Notify(Notification::info(GUEST_REQUEST_TEXT))];
        }

        let Some(call_id) = self.session.call_id.clone() else {
            tracing::debug!("ignoring access request with no call mounted");
            return vec![];
        };

        if self.session.is_requesting_access {
            tracing::debug!(%call_id, "access request already in flight");
            return vec![];
        }

        self.session.is_requesting_access = true;
        vec![AccessAction::RequestJoin { generation: self.generation, call_id }, AccessAction::Render]
    }

    /// Current session view.
    pub fn session(&self) -> &CallSession {
        &self.session
    }

    /// Local user.
    pub fn user(&self) -> &UserIdentity {
        &self.user
    }

    /// Current session generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the polling timer should be armed.
    pub fn is_polling(&self) -> bool {
        self.polling
    }

    /// Start a fresh session for `call_id`, keeping the external `joined`
    /// flag.
    fn reset(&mut self, call_id: Option<CallId>) -> Vec<AccessAction> {
        self.generation += 1;
        let joined = self.session.joined;
        self.session = CallSession::new(call_id.clone());
        self.session.joined = joined;

        let mut actions = Vec::new();
        if self.polling {
            self.polling = false;
            actions.push(AccessAction::StopPolling);
        }

        if let Some(call_id) = call_id {
            tracing::debug!(%call_id, generation = self.generation, "call session started");
            actions.push(AccessAction::FetchCreator { generation: self.generation, call_id });
        }

        self.reconcile_polling(&mut actions);
        actions.push(AccessAction::Render);
        actions
    }

    /// Arm or disarm polling to match the current session.
    ///
    /// Guests are granted access here without any request.
    fn reconcile_polling(&mut self, actions: &mut Vec<AccessAction>) {
        if self.user.is_guest() {
            if self.session.call_id.is_some() {
                self.session.grant_locally();
            }
            self.stop_polling(actions);
            return;
        }

        let call_id = match &self.session.call_id {
            Some(call_id) if !self.session.joined => call_id.clone(),
            _ => {
                self.stop_polling(actions);
                return;
            },
        };

        if !self.polling {
            self.polling = true;
            actions.push(AccessAction::CheckAccess { generation: self.generation, call_id });
            actions.push(AccessAction::StartPolling { interval: self.config.poll_interval });
        }
    }

    fn stop_polling(&mut self, actions: &mut Vec<AccessAction>) {
        if self.polling {
            self.polling = false;
            actions.push(AccessAction::StopPolling);
        }
    }

    fn poll_tick(&self) -> Vec<AccessAction> {
        if !self.polling || self.session.joined || self.user.is_guest() {
            return vec![];
        }
        match &self.session.call_id {
            Some(call_id) => {
                vec![AccessAction::CheckAccess { generation: self.generation, call_id: call_id.clone() }]
            },
            None => vec![],
        }
    }

    fn is_stale(&self, generation: u64, probe: &'static str) -> bool {
        let stale = generation != self.generation;
        if stale {
            tracing::debug!(probe, generation, current = self.generation, "discarding stale response");
        }
        stale
    }

    fn apply_creator(&mut self, outcome: FetchOutcome<CreatorInfo>) -> Vec<AccessAction> {
        match outcome {
            FetchOutcome::Ok(creator) => {
                self.session.creator_info = Some(creator);
            },
            FetchOutcome::NotFound => {
                self.session.creator_info = None;
                self.session.open_anonymously();
            },
            FetchOutcome::Failed(reason) => {
                tracing::warn!(call_id = ?self.session.call_id, %reason, "failed to fetch creator info");
                return vec![];
            },
        }
        vec![AccessAction::Render]
    }

    fn apply_access(&mut self, outcome: FetchOutcome<AccessGrant>) -> Vec<AccessAction> {
        // Guests are granted locally and never issue access checks.
        if self.user.is_guest() {
            return vec![];
        }
        match outcome {
            FetchOutcome::Ok(grant) => {
                self.session.has_access = Some(grant.has_access);
                self.session.is_creator = grant.is_creator;
                self.session.anonymous = false;
            },
            FetchOutcome::NotFound => {
                self.session.creator_info = None;
                self.session.open_anonymously();
            },
            FetchOutcome::Failed(reason) => {
                tracing::warn!(call_id = ?self.session.call_id, %reason, "failed to check access");
                return vec![];
            },
        }
        vec![AccessAction::Render]
    }

    fn apply_join_request(&mut self, outcome: JoinOutcome) -> Vec<AccessAction> {
        self.session.is_requesting_access = false;

        let notification = match outcome {
            JoinOutcome::Requested => Notification::success(REQUEST_SENT_TEXT),
            JoinOutcome::Rejected { status, message } => {
                tracing::warn!(status, ?message, "join request rejected");
                Notification::error(
                    message.filter(|m| !m.is_empty()).unwrap_or_else(|| REQUEST_FAILED_TEXT.into()),
                )
            },
            JoinOutcome::Failed(reason) => {
                tracing::warn!(%reason, "join request failed");
                Notification::error(REQUEST_FAILED_TEXT)
            },
        };

        vec![AccessAction::Notify(notification), AccessAction::Render]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccessStatus, NotificationLevel};

    fn identified() -> AccessClient {
        AccessClient::new(UserIdentity::Identified { id: "u2".into() }, AccessConfig::default())
    }

    fn guest() -> AccessClient {
        AccessClient::new(UserIdentity::Guest, AccessConfig::default())
    }

    fn call(id: &str) -> Option<CallId> {
        CallId::parse(id)
    }

    fn creator(id: &str) -> CreatorInfo {
        CreatorInfo { id: id.into(), name: Some("Ada".into()), email: None, image: None }
    }

    fn count_checks(actions: &[AccessAction]) -> usize {
        actions.iter().filter(|a| matches!(a, AccessAction::CheckAccess { .. })).count()
    }

    #[test]
    fn mount_fetches_creator_and_starts_polling() {
        let mut client = identified();
        let actions = client.set_call(call("abc123"));

        assert!(matches!(actions.as_slice(), [
            AccessAction::FetchCreator { generation: 1, .. },
            AccessAction::CheckAccess { generation: 1, .. },
            AccessAction::StartPolling { .. },
            AccessAction::Render
        ]));
        assert!(client.is_polling());
    }

    #[test]
    fn guest_granted_without_check() {
        let mut client = guest();
        let actions = client.set_call(call("xyz789"));

        assert_eq!(count_checks(&actions), 0);
        assert!(!client.is_polling());
        assert_eq!(client.session().has_access, Some(true));
        assert!(!client.session().is_creator);

        assert!(client.handle(AccessEvent::PollTick).is_empty());
    }

    #[test]
    fn joined_guest_is_granted_on_call_switch() {
        let mut client = guest();
        let _ = client.set_joined(true);
        let actions = client.set_call(call("xyz789"));

        assert_eq!(count_checks(&actions), 0);
        assert_eq!(client.session().has_access, Some(true));
    }

    #[test]
    fn pending_access_scenario() {
        let mut client = identified();
        let _ = client.set_call(call("abc123"));
        let generation = client.generation();

        let _ = client.handle(AccessEvent::AccessChecked {
            generation,
            outcome: FetchOutcome::Ok(AccessGrant { has_access: false, is_creator: false }),
        });
        let _ = client
            .handle(AccessEvent::CreatorFetched { generation, outcome: FetchOutcome::Ok(creator("u1")) });

        assert_eq!(client.session().status(), AccessStatus::PendingAccess);
        assert_eq!(client.session().creator_info.as_ref().map(|c| c.id.as_str()), Some("u1"));
    }

    #[test]
    fn not_found_opens_room() {
        let mut client = identified();
        let _ = client.set_call(call("abc123"));
        let generation = client.generation();

        let _ = client.handle(AccessEvent::CreatorFetched { generation, outcome: FetchOutcome::NotFound });
        let _ = client.handle(AccessEvent::AccessChecked { generation, outcome: FetchOutcome::NotFound });

        let session = client.session();
        assert_eq!(session.has_access, Some(true));
        assert!(!session.is_creator);
        assert_eq!(session.creator_info, None);
        assert_eq!(session.status(), AccessStatus::AnonymousOpen);

        // Still polling until joined
        assert_eq!(count_checks(&client.handle(AccessEvent::PollTick)), 1);
    }

    #[test]
    fn failure_keeps_previous_state() {
        let mut client = identified();
        let _ = client.set_call(call("abc123"));
        let generation = client.generation();
        let _ = client.handle(AccessEvent::AccessChecked {
            generation,
            outcome: FetchOutcome::Ok(AccessGrant { has_access: true, is_creator: true }),
        });
        let before = client.session().clone();

        let actions = client.handle(AccessEvent::AccessChecked {
            generation,
            outcome: FetchOutcome::Failed("connection reset".into()),
        });
        assert!(actions.is_empty());
        assert_eq!(client.session(), &before);

        let actions = client.handle(AccessEvent::CreatorFetched {
            generation,
            outcome: FetchOutcome::Failed("HTTP 500".into()),
        });
        assert!(actions.is_empty());
        assert_eq!(client.session(), &before);
    }

    #[test]
    fn joined_stops_polling() {
        let mut client = identified();
        let _ = client.set_call(call("abc123"));

        let actions = client.set_joined(true);
        assert!(matches!(actions.as_slice(), [AccessAction::StopPolling, AccessAction::Render]));
        assert!(client.handle(AccessEvent::PollTick).is_empty());

        // Leaving the call resumes polling
        let actions = client.set_joined(false);
        assert_eq!(count_checks(&actions), 1);
        assert!(client.is_polling());
    }

    #[test]
    fn call_change_discards_stale_responses() {
        let mut client = identified();
        let _ = client.set_call(call("first"));
        let old = client.generation();

        let actions = client.set_call(call("second"));
        assert_eq!(actions.first(), Some(&AccessAction::StopPolling));

        let actions = client.handle(AccessEvent::AccessChecked {
            generation: old,
            outcome: FetchOutcome::Ok(AccessGrant { has_access: true, is_creator: true }),
        });
        assert!(actions.is_empty());
        assert_eq!(client.session().has_access, None);
    }

    #[test]
    fn same_call_is_noop() {
        let mut client = identified();
        let _ = client.set_call(call("abc123"));
        assert!(client.set_call(call("abc123")).is_empty());
    }

    #[test]
    fn unmount_stops_polling() {
        let mut client = identified();
        let _ = client.set_call(call("abc123"));

        let actions = client.set_call(None);
        assert!(matches!(actions.as_slice(), [AccessAction::StopPolling, AccessAction::Render]));
        assert!(!client.is_polling());
    }

    #[test]
    fn request_access_round_trip() {
        let mut client = identified();
        let _ = client.set_call(call("abc123"));

        let actions = client.request_access();
        assert!(matches!(actions.as_slice(), [AccessAction::RequestJoin { .. }, AccessAction::Render]));
        assert!(client.session().is_requesting_access);

        let actions = client.handle(AccessEvent::JoinRequestCompleted {
            generation: client.generation(),
            outcome: JoinOutcome::Requested,
        });
        assert!(matches!(
            actions.first(),
            Some(AccessAction::Notify(Notification { level: NotificationLevel::Success, .. }))
        ));
        assert!(!client.session().is_requesting_access);
    }

    #[test]
    fn request_access_conflict_surfaces_server_message() {
        let mut client = identified();
        let _ = client.set_call(call("abc123"));
        let _ = client.request_access();

        let actions = client.handle(AccessEvent::JoinRequestCompleted {
            generation: client.generation(),
            outcome: JoinOutcome::Rejected { status: 409, message: Some("Already requested".into()) },
        });

        assert_eq!(actions.first(), Some(&AccessAction::Notify(Notification::error("Already requested"))));
        assert!(!client.session().is_requesting_access);
    }

    #[test]
    fn request_access_network_failure_uses_default_text() {
        let mut client = identified();
        let _ = client.set_call(call("abc123"));
        let _ = client.request_access();

        let actions = client.handle(AccessEvent::JoinRequestCompleted {
            generation: client.generation(),
            outcome: JoinOutcome::Failed("dns".into()),
        });

        assert_eq!(actions.first(), Some(&AccessAction::Notify(Notification::error(REQUEST_FAILED_TEXT))));
        assert!(!client.session().is_requesting_access);
    }

    #[test]
    fn guest_request_is_informational() {
        let mut client = guest();
        let _ = client.set_call(call("xyz789"));

        let actions = client.request_access();
        assert_eq!(actions, vec![AccessAction::Notify(Notification::info(GUEST_REQUEST_TEXT))]);
        assert!(!client.session().is_requesting_access);
    }

    #[test]
    fn guest_request_without_call_is_informational() {
        let mut client = guest();

        let actions = client.request_access();
        assert_eq!(actions, vec![AccessAction::Notify(Notification::info(GUEST_REQUEST_TEXT))]);
    }

    #[test]
    fn switching_to_guest_stops_polling() {
        let mut client = identified();
        let _ = client.set_call(call("abc123"));

        let actions = client.handle(AccessEvent::UserChanged { user: UserIdentity::Guest });
        assert_eq!(count_checks(&actions), 0);
        assert!(!client.is_polling());
        assert_eq!(client.session().has_access, Some(true));
    }
}
