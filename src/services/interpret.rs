//! Response interpreter: turns a classified [`Report`] into feedback.
//!
//! Classification itself happens at the remote boundary
//! ([`wire::classify`]); this module only decides what each variant says.
//! Every report produces its log lines plus exactly one success notification.

#[cfg(test)]
#[path = "interpret_test.rs"]
mod interpret_test;

use wire::Report;

use super::{Feedback, Severity};
use crate::util::format::report_timestamp;

pub const COMPLETED_NOTIFICATION: &str = "Operation completed successfully";
pub const UNRECOGNIZED_LINE: &str = "Operation completed";

#[derive(Clone)]
pub struct Interpreter {
    feedback: Feedback,
}

impl Interpreter {
    #[must_use]
    pub fn new(feedback: Feedback) -> Self {
        Self { feedback }
    }

    pub fn interpret(&self, report: &Report) {
        if matches!(report, Report::Unrecognized(_)) {
            tracing::debug!(?report, "report matched no known shape");
        }
        for (severity, line) in report_lines(report) {
            self.feedback.log.append(severity, line);
        }
        self.feedback
            .notifications
            .push(Severity::Success, COMPLETED_NOTIFICATION);
    }
}

/// Log lines for `report`, in emission order.
#[must_use]
pub fn report_lines(report: &Report) -> Vec<(Severity, String)> {
    match report {
        Report::Hash { hash, filename, timestamp } => vec![
            (Severity::Success, format!("SHA-256 Hash: {hash}")),
            (Severity::Info, format!("File: {filename}")),
            (Severity::Info, format!("Timestamp: {}", report_timestamp(timestamp))),
        ],
        Report::Integrity { verified, current_hash, stored_hash } => {
            let verdict = if *verified {
                (Severity::Success, "File Integrity: VERIFIED".to_owned())
            } else {
                (Severity::Error, "File Integrity: MODIFIED".to_owned())
            };
            vec![
                verdict,
                (Severity::Info, format!("Current Hash: {current_hash}")),
                (Severity::Info, format!("Stored Hash: {stored_hash}")),
            ]
        }
        Report::Message { message } => vec![(Severity::Success, message.clone())],
        Report::Hashes { count, entries } => {
            let mut lines = Vec::with_capacity(entries.len() + 1);
            lines.push((Severity::Info, format!("Stored Hashes ({count} files):")));
            lines.extend(
                entries
                    .iter()
                    .map(|(name, record)| (Severity::Info, format!("  {name}: {}", record.hash))),
            );
            lines
        }
        Report::SystemInfo(info) => vec![
            (Severity::Info, "=== System Information ===".to_owned()),
            (Severity::Info, format!("Stored Hashes: {}", info.stored_hashes)),
            (Severity::Info, format!("Backup Files: {}", info.backup_files)),
            (Severity::Info, format!("Encryption Key: {}", info.encryption_key)),
            (Severity::Info, format!("Cipher Suite: {}", info.cipher_suite)),
        ],
        Report::Password { .. } | Report::Unrecognized(_) => {
            vec![(Severity::Info, UNRECOGNIZED_LINE.to_owned())]
        }
    }
}
