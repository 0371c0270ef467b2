//! Call access layer for Call0
//!
//! Pure state machine and generic runtime deciding whether the local user may
//! enter a call, enabling deterministic simulation testing with the same code
//! that runs in production.
//!
//! # Components
//!
//! - [`AccessClient`]: access state machine (creator probe, access polling,
//!   join requests)
//! - [`CallSession`]: view model consumed by the call UI
//! - [`Driver`]: trait for backend requests and UI output
//! - [`Runtime`]: generic event loop owning the polling timer
//!
//! # Policy
//!
//! - A `404` from either probe means the call has no backend record and is
//!   open to anyone.
//! - Guests are granted access locally and never poll.
//! - Polling stops once the user has joined.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod access;
mod action;
mod config;
mod driver;
mod event;
mod notification;
mod outcome;
mod runtime;
mod session;

pub use access::{AccessClient, GUEST_REQUEST_TEXT, REQUEST_FAILED_TEXT, REQUEST_SENT_TEXT};
pub use action::AccessAction;
pub use config::{AccessConfig, DEFAULT_POLL_INTERVAL};
pub use driver::Driver;
pub use event::AccessEvent;
pub use notification::{Notification, NotificationLevel};
pub use outcome::{FetchOutcome, JoinOutcome};
pub use runtime::{Command, Runtime, RuntimeClosed, RuntimeHandle};
pub use session::{
    AccessGrant, AccessStatus, CallId, CallSession, CreatorInfo, GUEST_SENTINEL, UserIdentity,
};
