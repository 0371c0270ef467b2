//! Access client configuration.

use std::time::Duration;

/// Default delay between access checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Configuration for [`crate::AccessClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessConfig {
    /// Delay between access checks while waiting to join.
    pub poll_interval: Duration,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self { poll_interval: DEFAULT_POLL_INTERVAL }
    }
}
