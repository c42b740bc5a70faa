//! User-visible notifications.

use parking_lot::Mutex;

/// Outcome a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Shown in green.
    Success,
    /// Shown in red.
    Error,
}

/// A toast shown after a mutation settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Success or error.
    pub kind: NotificationKind,
    /// Headline.
    pub title: String,
    /// Body text.
    pub message: String,
}

impl Notification {
    /// A "Transaction successful!" notification.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: "Transaction successful!".to_string(),
            message: message.into(),
        }
    }

    /// An "Error!" notification carrying the raw error message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: "Error!".to_string(),
            message: message.into(),
        }
    }
}

/// Displays notifications.
pub trait Notifier: Send + Sync {
    /// Show one notification.
    fn show(&self, notification: Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn show(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => {
                tracing::info!(title = %notification.title, "{}", notification.message)
            }
            NotificationKind::Error => {
                tracing::warn!(title = %notification.title, "{}", notification.message)
            }
        }
    }
}

/// Keeps every notification, for assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything shown so far.
    pub fn shown(&self) -> Vec<Notification> {
        self.shown.lock().clone()
    }

    /// The most recent notification.
    pub fn last(&self) -> Option<Notification> {
        self.shown.lock().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, notification: Notification) {
        self.shown.lock().push(notification);
    }
}
