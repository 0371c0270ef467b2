//! Access client input events.
//!
//! This module defines [`AccessEvent`], the complete set of inputs that drive
//! the [`crate::AccessClient`] state machine.
//!
//! Events originate from three distinct sources:
//! - The call UI (call id, joined flag, user identity, button presses).
//! - The polling timer.
//! - Completions of requests issued by earlier [`crate::AccessAction`]s.

use crate::{AccessGrant, CallId, CreatorInfo, FetchOutcome, JoinOutcome, UserIdentity};

/// Events processed by the access state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessEvent {
    /// Call UI mounted, switched calls, or unmounted (`None`).
    CallChanged {
        /// New call identifier.
        call_id: Option<CallId>,
    },

    /// The external `joined` flag changed.
    JoinedChanged {
        /// User is in the call.
        joined: bool,
    },

    /// The signed-in identity changed.
    UserChanged {
        /// New identity.
        user: UserIdentity,
    },

    /// Polling timer fired.
    PollTick,

    /// User asked the host for access.
    RequestAccess,

    /// `GET /calls/{id}/creator` completed.
    CreatorFetched {
        /// Session generation the request was issued in.
        generation: u64,
        /// Classified response.
        outcome: FetchOutcome<CreatorInfo>,
    },

    /// `GET /calls/{id}/check-access` completed.
    AccessChecked {
        /// Session generation the request was issued in.
        generation: u64,
        /// Classified response.
        outcome: FetchOutcome<AccessGrant>,
    },

    /// `POST /calls/{id}/request-join` completed.
    JoinRequestCompleted {
        /// Session generation the request was issued in.
        generation: u64,
        /// Classified response.
        outcome: JoinOutcome,
    },
}
