//! User-facing notifications.
//!
//! Every flow reports through a [`Notifier`]. Flows whose failures are quiet
//! by default (logout, initial load) route through an [`ErrorPolicy`] first.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastVariant {
    Default,
    Destructive,
}

/// A single message for the user: title, description and tone. Errors of
/// every kind share this one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

impl Toast {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Default,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Destructive,
        }
    }

    pub fn is_error(&self) -> bool {
        self.variant == ToastVariant::Destructive
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn notify(&self, toast: Toast) {
        (**self).notify(toast);
    }
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify(&self, toast: Toast) {
        (**self).notify(toast);
    }
}

// ---------------------------------------------------------------------------
// ToastLog
// ---------------------------------------------------------------------------

/// Collects toasts so a caller can render them after an operation.
#[derive(Debug, Default)]
pub struct ToastLog {
    toasts: Mutex<Vec<Toast>>,
}

impl ToastLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain collected toasts in the order they were raised.
    pub fn take(&self) -> Vec<Toast> {
        let mut guard = self.toasts.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *guard)
    }

    pub fn snapshot(&self) -> Vec<Toast> {
        self.toasts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Notifier for ToastLog {
    fn notify(&self, toast: Toast) {
        self.toasts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(toast);
    }
}

// ---------------------------------------------------------------------------
// TracingNotifier
// ---------------------------------------------------------------------------

/// Sends toasts to the log instead of a screen.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        match toast.variant {
            ToastVariant::Default => {
                tracing::info!(title = %toast.title, "{}", toast.description)
            }
            ToastVariant::Destructive => {
                tracing::warn!(title = %toast.title, "{}", toast.description)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ErrorPolicy
// ---------------------------------------------------------------------------

/// Whether a flow's failures reach the user or only the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    #[default]
    Silent,
    Surface,
}

impl ErrorPolicy {
    pub fn report(self, notifier: &impl Notifier, toast: Toast) {
        match self {
            ErrorPolicy::Silent => {}
            ErrorPolicy::Surface => notifier.notify(toast),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_log_drains_in_order() {
        let log = ToastLog::new();
        log.notify(Toast::success("a", "first"));
        log.notify(Toast::error("b", "second"));
        let toasts = log.take();
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].title, "a");
        assert!(toasts[1].is_error());
        assert!(log.take().is_empty());
    }

    #[test]
    fn silent_policy_drops_toast() {
        let log = ToastLog::new();
        ErrorPolicy::Silent.report(&log, Toast::error("x", "y"));
        assert!(log.snapshot().is_empty());
    }

    #[test]
    fn surface_policy_forwards_toast() {
        let log = ToastLog::new();
        ErrorPolicy::Surface.report(&log, Toast::error("x", "y"));
        assert_eq!(log.snapshot().len(), 1);
    }

    #[test]
    fn policy_deserializes_from_snake_case() {
        let p: ErrorPolicy = serde_yaml::from_str("surface").unwrap();
        assert_eq!(p, ErrorPolicy::Surface);
    }
}
