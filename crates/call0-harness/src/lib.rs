//! Deterministic simulation harness for Call0 access testing.
//!
//! A scripted implementation of the [`call0_access::Driver`] trait for
//! deterministic, reproducible testing of the access runtime on a paused
//! tokio clock.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the access
//! policy invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod sim_driver;

pub use invariants::{
    AnonymousRoomOpen, GuestAlwaysGranted, Invariant, InvariantRegistry, InvariantResult,
    SessionSnapshot, UnmountedIsBlank, Violation,
};
pub use sim_driver::{RecordedRequest, RequestKind, SimDriver};
