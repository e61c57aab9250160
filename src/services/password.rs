//! Password panel: generation and copy of the current secret.
//!
//! Generation goes through the [`Dispatcher`] like every other operation, so
//! it shares the busy flag and the failure boundary. A successful reply lands
//! here via [`record_secret`], which supersedes the session's secret.

#[cfg(test)]
#[path = "password_test.rs"]
mod password_test;

use std::sync::Arc;

use tracing::warn;
use wire::{Operation, PasswordPolicy};

use super::clipboard::{Clipboard, ClipboardError, CopyPath};
use super::dispatch::{DispatchStatus, Dispatcher};
use super::{Feedback, Severity};
use crate::state::{GeneratedSecret, Session};

pub const NO_SECRET_NOTIFICATION: &str = "No password to copy";
pub const COPIED_NOTIFICATION: &str = "Password copied to clipboard";

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("no password has been generated")]
    NoSecret,
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

/// Display colour class for a strength label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrengthTier {
    Success,
    Info,
    Amber,
    Warning,
}

impl StrengthTier {
    /// Substring match, strongest first; labels may carry decoration.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        if label.contains("VERY STRONG") {
            Self::Success
        } else if label.contains("STRONG") {
            Self::Info
        } else if label.contains("MODERATE") {
            Self::Amber
        } else {
            Self::Warning
        }
    }

    /// ANSI foreground colour: green, cyan, yellow, red.
    #[must_use]
    pub fn ansi_color(self) -> &'static str {
        match self {
            Self::Success => "\x1b[32m",
            Self::Info => "\x1b[36m",
            Self::Amber => "\x1b[33m",
            Self::Warning => "\x1b[31m",
        }
    }
}

const ANSI_RESET: &str = "\x1b[0m";

/// `strength: <label>` with the label in its tier's colour.
#[must_use]
pub fn render_strength(label: &str) -> String {
    let tier = StrengthTier::from_label(label);
    format!("strength: {}{label}{ANSI_RESET}", tier.ansi_color())
}

/// Store `secret` as the session's current password and log it.
pub fn record_secret(session: &Session, feedback: &Feedback, secret: GeneratedSecret) {
    feedback.log.success(format!("Generated password: {}", secret.value));
    feedback.log.info(format!("Strength: {}", secret.strength_label));
    session.store_secret(secret);
}

pub struct PasswordPanel {
    dispatcher: Arc<Dispatcher>,
    clipboard: Arc<Clipboard>,
}

impl PasswordPanel {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>, clipboard: Arc<Clipboard>) -> Self {
        Self { dispatcher, clipboard }
    }

    pub async fn generate(&self, session: &Session, policy: PasswordPolicy) -> DispatchStatus {
        if !policy.has_charset() {
            warn!(length = policy.length(), "password: no character class enabled, expecting a rejection");
        }
        self.dispatcher
            .invoke(session, Operation::GeneratePassword, Some(policy))
            .await
    }

    /// Tier of the current secret, if any.
    #[must_use]
    pub fn current_tier(&self, session: &Session) -> Option<StrengthTier> {
        session
            .secret()
            .map(|secret| StrengthTier::from_label(&secret.strength_label))
    }

    /// Coloured strength display for the current secret.
    #[must_use]
    pub fn strength_display(&self, session: &Session) -> Option<String> {
        session.secret().map(|secret| render_strength(&secret.strength_label))
    }

    /// Copy the last generated password.
    ///
    /// # Errors
    ///
    /// [`PasswordError::NoSecret`] before the first generation, or the
    /// clipboard error when no path worked. Either way an error notification
    /// has been emitted.
    pub fn copy_current(&self, session: &Session) -> Result<CopyPath, PasswordError> {
        let notifications = &self.dispatcher.feedback().notifications;
        let Some(secret) = session.secret() else {
            notifications.push(Severity::Error, NO_SECRET_NOTIFICATION);
            return Err(PasswordError::NoSecret);
        };
        match self.clipboard.copy(&secret.value) {
            Ok(path) => {
                notifications.push(Severity::Success, COPIED_NOTIFICATION);
                Ok(path)
            }
            Err(err) => {
                warn!(error = %err, "password copy failed");
                notifications.push(Severity::Error, "Failed to copy password");
                Err(err.into())
            }
        }
    }
}
