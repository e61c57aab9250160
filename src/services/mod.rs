//! Services: operation dispatch plus the two feedback channels.
//!
//! DESIGN
//! ======
//! Every user-facing message goes through [`Feedback`], which bundles the
//! ephemeral [`NotificationFeed`] and the session-long [`OperationLog`]. Both
//! are cheap clonable handles over shared state, so any service can emit
//! without owning the channels. Developer diagnostics use `tracing` instead
//! and never reach either channel.

pub mod busy;
pub mod clipboard;
pub mod clock;
pub mod dispatch;
pub mod interpret;
pub mod jobs;
pub mod notifications;
pub mod oplog;
pub mod password;
pub mod sink;
pub mod telemetry;

use std::path::PathBuf;

use tracing::warn;

use clipboard::{Clipboard, ClipboardError, CopyPath};
use notifications::NotificationFeed;
use oplog::OperationLog;
use sink::ArtifactSink;

/// Tone of a notification or log entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Severity {
    #[default]
    Info,
    Success,
    Error,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Both user-facing channels, cloned into every service that reports.
#[derive(Clone, Default)]
pub struct Feedback {
    pub notifications: NotificationFeed,
    pub log: OperationLog,
}

impl Feedback {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// One error notification plus one matching error log entry.
    pub fn fail(&self, notification: impl Into<String>, log_line: impl Into<String>) {
        self.notifications.push(Severity::Error, notification);
        self.log.append(Severity::Error, log_line);
    }

    /// Write the log export through `sink` and confirm with a notification.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from the sink; an error notification has already
    /// been emitted.
    pub async fn save_log(&self, sink: &dyn ArtifactSink) -> std::io::Result<PathBuf> {
        let export = self.log.export_snapshot();
        match sink.save(&export.file_name, export.contents.as_bytes()).await {
            Ok(path) => {
                self.notifications.push(Severity::Success, "Log saved successfully");
                Ok(path)
            }
            Err(err) => {
                warn!(error = %err, file = %export.file_name, "log export failed");
                self.notifications
                    .push(Severity::Error, format!("Failed to save log: {err}"));
                Err(err)
            }
        }
    }

    /// Copy the log text to the clipboard and confirm with a notification.
    ///
    /// # Errors
    ///
    /// Returns [`ClipboardError`] when neither clipboard path worked.
    pub fn copy_log(&self, clipboard: &Clipboard) -> Result<CopyPath, ClipboardError> {
        match self.log.copy_snapshot(clipboard) {
            Ok(path) => {
                self.notifications
                    .push(Severity::Success, "Console output copied to clipboard");
                Ok(path)
            }
            Err(err) => {
                warn!(error = %err, "log copy failed");
                self.notifications.push(Severity::Error, "Failed to copy output");
                Err(err)
            }
        }
    }
}
