//! Access client side-effects and intents.
//!
//! This module defines the [`AccessAction`] enum, which represents
//! instructions produced by the [`crate::AccessClient`] state machine for the
//! runtime to execute.

use std::time::Duration;

use crate::{CallId, Notification};

/// Actions produced by the access state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessAction {
    /// Session view changed; re-render.
    Render,

    /// Fetch the creator of a call.
    FetchCreator {
        /// Session generation to tag the completion with.
        generation: u64,
        /// Call to query.
        call_id: CallId,
    },

    /// Check whether the user may enter a call.
    CheckAccess {
        /// Session generation to tag the completion with.
        generation: u64,
        /// Call to query.
        call_id: CallId,
    },

    /// Ask the call's host for approval.
    RequestJoin {
        /// Session generation to tag the completion with.
        generation: u64,
        /// Call to join.
        call_id: CallId,
    },

    /// Arm the polling timer. Replaces any running timer.
    StartPolling {
        /// Delay between access checks.
        interval: Duration,
    },

    /// Disarm the polling timer.
    StopPolling,

    /// Show a transient notification.
    Notify(Notification),
}
