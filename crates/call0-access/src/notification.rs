//! Transient user-facing notifications.

use serde::{Deserialize, Serialize};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationLevel {
    /// Informational.
    Info,
    /// An action succeeded.
    Success,
    /// An action failed.
    Error,
}

/// A toast shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Text to display.
    pub text: String,
}

impl Notification {
    /// Informational notification.
    pub fn info(text: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Info, text: text.into() }
    }

    /// Success notification.
    pub fn success(text: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Success, text: text.into() }
    }

    /// Error notification.
    pub fn error(text: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Error, text: text.into() }
    }
}
