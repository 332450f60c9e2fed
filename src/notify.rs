//! User-visible notification channel.
//!
//! The session manager and the presentation collaborators publish
//! transient `{severity, title, message}` notices (generation failures,
//! copy/export outcomes) through a [`Notifier`]. Where they are displayed
//! depends on the front end:
//!
//! - [`ConsoleNotifier`]: stderr, for the CLI.
//! - [`TracingNotifier`]: the tracing log, for the HTTP server, whose
//!   clients read outcomes from response bodies instead.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("info"),
            Severity::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Prints notifications to stderr.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Info => eprintln!("{}: {}", notification.title, notification.message),
            Severity::Error => eprintln!("✗ {}: {}", notification.title, notification.message),
        }
    }
}

/// Emits notifications as tracing events.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Info => {
                tracing::info!(title = %notification.title, "{}", notification.message)
            }
            Severity::Error => {
                tracing::warn!(title = %notification.title, "{}", notification.message)
            }
        }
    }
}
