//! Invariant checking for deterministic simulation testing.
//!
//! Invariants are properties that must always hold during execution. Unlike
//! example-based tests that check specific scenarios, invariants verify
//! behavioral properties across all execution paths.
//!
//! # Architecture
//!
//! Every rendered [`call0_access::CallSession`] is paired with the local
//! user into a [`SessionSnapshot`], then registered [`Invariant`] checks run
//! against it.
//!
//! # Usage
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! registry.check_all(&SessionSnapshot::new(user, session))?;
//! ```

mod checks;

use call0_access::{CallSession, UserIdentity};
pub use checks::{AnonymousRoomOpen, GuestAlwaysGranted, UnmountedIsBlank};

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Name of the violated invariant.
    pub invariant: &'static str,
    /// Description of what went wrong.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// Observable state checked by invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Local user.
    pub user: UserIdentity,
    /// Rendered session.
    pub session: CallSession,
}

impl SessionSnapshot {
    /// Pair a session with its user.
    pub fn new(user: UserIdentity, session: CallSession) -> Self {
        Self { user, session }
    }
}

/// An invariant that can be checked against session state.
pub trait Invariant: Send + Sync {
    /// Invariant name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant against the current state.
    fn check(&self, state: &SessionSnapshot) -> InvariantResult;
}

/// Registry of invariants to check.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with the access policy invariants.
    ///
    /// Includes:
    /// - [`AnonymousRoomOpen`]: a call unknown to the backend is open
    /// - [`GuestAlwaysGranted`]: guests always have access
    /// - [`UnmountedIsBlank`]: no state survives unmounting
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(AnonymousRoomOpen);
        registry.add(GuestAlwaysGranted);
        registry.add(UnmountedIsBlank);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants against the given state.
    ///
    /// Returns `Ok(())` if all invariants hold, or all violations found.
    pub fn check_all(&self, state: &SessionSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}
