//! Operation log, the session-long append-only console.
//!
//! DESIGN
//! ======
//! Entries are immutable and ordered by append. The only destructive action is
//! [`OperationLog::clear`], which swaps the whole sequence for a single
//! synthetic entry under one lock, so no reader ever observes a partially
//! cleared log. Nothing is persisted; export and copy produce plain text.

#[cfg(test)]
#[path = "oplog_test.rs"]
mod oplog_test;

use std::sync::{Arc, Mutex, PoisonError};

use time::OffsetDateTime;
use tokio::sync::broadcast;

use super::Severity;
use super::clipboard::{Clipboard, ClipboardError, CopyPath};
use crate::util::format::{clock_time, file_stamp, now_local};

pub const CLEARED_TEXT: &str = "Output console cleared";
pub const EXPORT_PREFIX: &str = "cybershield-log-";

const EVENT_CAPACITY: usize = 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub severity: Severity,
    pub timestamp: OffsetDateTime,
    pub text: String,
}

impl LogEntry {
    /// `[HH:MM:SS] text`
    #[must_use]
    pub fn render(&self) -> String {
        format!("[{}] {}", clock_time(self.timestamp), self.text)
    }
}

/// A rendered log ready to be written out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogExport {
    pub file_name: String,
    pub contents: String,
}

#[derive(Clone)]
pub struct OperationLog {
    entries: Arc<Mutex<Vec<LogEntry>>>,
    events: broadcast::Sender<LogEntry>,
}

impl Default for OperationLog {
    fn default() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { entries: Arc::new(Mutex::new(Vec::new())), events }
    }
}

impl OperationLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, severity: Severity, text: impl Into<String>) {
        self.push(LogEntry { severity, timestamp: now_local(), text: text.into() });
    }

    pub fn info(&self, text: impl Into<String>) {
        self.append(Severity::Info, text);
    }

    pub fn success(&self, text: impl Into<String>) {
        self.append(Severity::Success, text);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.append(Severity::Error, text);
    }

    /// Replace every entry with a single "cleared" entry.
    pub fn clear(&self) {
        let marker = LogEntry { severity: Severity::Info, timestamp: now_local(), text: CLEARED_TEXT.to_owned() };
        *self.lock() = vec![marker.clone()];
        let _ = self.events.send(marker);
    }

    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    /// Entry texts only, in order.
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.lock().iter().map(|e| e.text.clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Every entry rendered on its own line.
    #[must_use]
    pub fn snapshot_text(&self) -> String {
        self.lock()
            .iter()
            .map(LogEntry::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[must_use]
    pub fn export_snapshot(&self) -> LogExport {
        self.export_snapshot_at(OffsetDateTime::now_utc())
    }

    #[must_use]
    pub fn export_snapshot_at(&self, now: OffsetDateTime) -> LogExport {
        LogExport { file_name: export_file_name(now), contents: self.snapshot_text() }
    }

    /// Put the rendered log on the clipboard.
    ///
    /// # Errors
    ///
    /// Returns [`ClipboardError`] when both clipboard paths fail.
    pub fn copy_snapshot(&self, clipboard: &Clipboard) -> Result<CopyPath, ClipboardError> {
        clipboard.copy(&self.snapshot_text())
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.events.subscribe()
    }

    fn push(&self, entry: LogEntry) {
        self.lock().push(entry.clone());
        let _ = self.events.send(entry);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `cybershield-log-2024-03-09T12-05-07.txt`
#[must_use]
pub fn export_file_name(now: OffsetDateTime) -> String {
    format!("{EXPORT_PREFIX}{}.txt", file_stamp(now))
}
