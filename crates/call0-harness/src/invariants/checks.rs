//! Access policy invariants.

use super::{Invariant, InvariantResult, SessionSnapshot, Violation};

/// A call the backend has no record of is open to anyone.
///
/// Once a probe answered `404`, access is granted and the user is not the
/// creator, until a later successful access check says otherwise.
pub struct AnonymousRoomOpen;

impl Invariant for AnonymousRoomOpen {
    fn name(&self) -> &'static str {
        "anonymous_room_open"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        let session = &state.session;
        if !session.anonymous {
            return Ok(());
        }
        if session.has_access != Some(true) || session.is_creator {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "anonymous call {:?} has has_access={:?} is_creator={}",
                    session.call_id, session.has_access, session.is_creator
                ),
            });
        }
        Ok(())
    }
}

/// Guests always have access to a mounted call and are never creators.
pub struct GuestAlwaysGranted;

impl Invariant for GuestAlwaysGranted {
    fn name(&self) -> &'static str {
        "guest_always_granted"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        let session = &state.session;
        if !state.user.is_guest() || session.call_id.is_none() {
            return Ok(());
        }
        if session.has_access != Some(true) || session.is_creator {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "guest in {:?} has has_access={:?} is_creator={}",
                    session.call_id, session.has_access, session.is_creator
                ),
            });
        }
        Ok(())
    }
}

/// With no call mounted, the session carries no access state.
pub struct UnmountedIsBlank;

impl Invariant for UnmountedIsBlank {
    fn name(&self) -> &'static str {
        "unmounted_is_blank"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        let session = &state.session;
        if session.call_id.is_some() {
            return Ok(());
        }
        if session.has_access.is_some()
            || session.creator_info.is_some()
            || session.is_requesting_access
            || session.anonymous
        {
            return Err(Violation {
                invariant: self.name(),
                message: format!("unmounted session carries state: {session:?}"),
            });
        }
        Ok(())
    }
}
