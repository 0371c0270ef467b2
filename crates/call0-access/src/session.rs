//! Observable call session state.
//!
//! This module defines the data structures that represent the client's
//! current view of one call: who the user is, who created the call, and
//! whether the user may enter it.
//!
//! [`CallSession`] serves as the "View Model" for the call UI. It is only
//! ever mutated by [`crate::AccessClient`]; everything else reads snapshots.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel user id the frontend assigns to visitors without an account.
pub const GUEST_SENTINEL: &str = "guest";

/// Opaque call identifier.
///
/// Never empty. An empty identifier means "no call" and is represented as
/// `Option<CallId>::None` instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallId(String);

impl CallId {
    /// Parse a raw call identifier. `None` if it is empty or whitespace.
    pub fn parse(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() { None } else { Some(Self(raw)) }
    }

    /// Identifier as sent in request paths.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of the local user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserIdentity {
    /// No persisted identity. Always has access, never polls.
    Guest,
    /// Signed-in user.
    Identified {
        /// Backend user id.
        id: String,
    },
}

impl UserIdentity {
    /// Classify a raw user id.
    ///
    /// Absent, empty, and the literal `"guest"` all map to [`Self::Guest`].
    pub fn from_raw(id: Option<&str>) -> Self {
        match id.map(str::trim) {
            None | Some("" | GUEST_SENTINEL) => Self::Guest,
            Some(id) => Self::Identified { id: id.to_string() },
        }
    }

    /// Whether this is a guest user.
    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }
}

/// Identity of the user who created a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorInfo {
    /// Backend user id.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Avatar URL.
    #[serde(default)]
    pub image: Option<String>,
}

/// Access decision returned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessGrant {
    /// User may enter the call.
    pub has_access: bool,
    /// User created the call.
    pub is_creator: bool,
}

/// Coarse access state derived from a [`CallSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessStatus {
    /// No answer yet.
    Unknown,
    /// Backend has no record of the call; anyone may enter.
    AnonymousOpen,
    /// Backend denied access and the user is not the creator.
    PendingAccess,
    /// User may enter.
    Granted,
    /// User is in the call. Polling has stopped.
    Joined,
}

/// Per-call session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSession {
    /// Call being viewed. `None` before mount and after unmount.
    pub call_id: Option<CallId>,
    /// User is in the call.
    pub joined: bool,
    /// Access decision. `None` until the first answer.
    pub has_access: Option<bool>,
    /// User created the call.
    pub is_creator: bool,
    /// A join request is in flight.
    pub is_requesting_access: bool,
    /// Creator of the call. `None` if unknown or the call is anonymous.
    pub creator_info: Option<CreatorInfo>,
    /// A probe reported the call as unknown to the backend.
    pub anonymous: bool,
}

impl Default for CallSession {
    fn default() -> Self {
        Self::new(None)
    }
}

impl CallSession {
    /// Fresh session for the given call.
    pub fn new(call_id: Option<CallId>) -> Self {
        Self {
            call_id,
            joined: false,
            has_access: None,
            is_creator: false,
            is_requesting_access: false,
            creator_info: None,
            anonymous: false,
        }
    }

    /// Derived access state.
    pub fn status(&self) -> AccessStatus {
        if self.joined {
            return AccessStatus::Joined;
        }
        match self.has_access {
            None => AccessStatus::Unknown,
            Some(true) if self.anonymous => AccessStatus::AnonymousOpen,
            Some(true) => AccessStatus::Granted,
            Some(false) if self.is_creator => AccessStatus::Granted,
            Some(false) => AccessStatus::PendingAccess,
        }
    }

    /// Whether the call UI may render the room.
    pub fn can_enter(&self) -> bool {
        self.has_access == Some(true) || self.is_creator
    }

    /// Apply the anonymous-room fallback.
    pub(crate) fn open_anonymously(&mut self) {
        self.has_access = Some(true);
        self.is_creator = false;
        self.anonymous = true;
    }

    /// Apply a local grant for guests.
    pub(crate) fn grant_locally(&mut self) {
        self.has_access = Some(true);
        self.is_creator = false;
    }
}
