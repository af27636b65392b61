//! Action outcome notifications
//!
//! The shelf controller emits one short-lived, human-readable notification
//! for every terminal action outcome. Delivery is an injected mpsc sender;
//! whoever owns the receiver decides how to present the message (status
//! line, banner, plain stdout). The controller never talks to a UI surface
//! directly.

use crate::state::PackageAction;
use std::sync::mpsc::Sender;

/// How the presentation layer should weight a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// One status message about a finished action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub package: String,
    pub action: PackageAction,
    pub severity: Severity,
    pub message: String,
}

/// The controller's half of the notification channel.
pub type NotificationSender = Sender<Notification>;

impl Notification {
    /// "VLC installed successfully"
    pub fn success(package: &str, action: PackageAction) -> Self {
        Self {
            package: package.to_string(),
            action,
            severity: Severity::Info,
            message: format!("{} {} successfully", package, action.past_tense()),
        }
    }

    /// "Error during installation"
    pub fn failure(package: &str, action: PackageAction) -> Self {
        Self {
            package: package.to_string(),
            action,
            severity: Severity::Error,
            message: format!("Error during {}", action.noun()),
        }
    }
}
