//! Clipboard access with a terminal fallback.
//!
//! The system clipboard (via `arboard`) is tried first. When it is unavailable,
//! as on a headless session or over SSH, the text is sent to the terminal as an
//! OSC 52 escape sequence, which most terminal emulators forward to the local
//! clipboard. A working fallback is reported as success.

#[cfg(test)]
#[path = "clipboard_test.rs"]
mod clipboard_test;

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("system clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("terminal clipboard write failed: {0}")]
    Terminal(#[from] std::io::Error),
    #[error("no clipboard path succeeded (primary: {primary}; fallback: {fallback})")]
    Exhausted { primary: String, fallback: String },
}

/// Which path delivered the text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyPath {
    Primary,
    Fallback,
}

/// Anything that can receive clipboard text.
pub trait ClipboardBackend: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ClipboardError`] when the text could not be placed.
    fn set_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// The desktop clipboard.
pub struct SystemClipboard;

impl ClipboardBackend for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        clipboard
            .set_text(text.to_owned())
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))
    }
}

/// OSC 52 writer; the terminal decides whether to honour it.
pub struct TerminalClipboard {
    out: Mutex<Box<dyn Write + Send>>,
}

impl TerminalClipboard {
    #[must_use]
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out: Mutex::new(out) }
    }

    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }
}

impl ClipboardBackend for TerminalClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(osc52_sequence(text).as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

/// `ESC ] 52 ; c ; <base64> BEL`
#[must_use]
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}

pub struct Clipboard {
    primary: Box<dyn ClipboardBackend>,
    fallback: Box<dyn ClipboardBackend>,
}

impl Clipboard {
    #[must_use]
    pub fn new(primary: Box<dyn ClipboardBackend>, fallback: Box<dyn ClipboardBackend>) -> Self {
        Self { primary, fallback }
    }

    /// System clipboard, falling back to OSC 52 on stdout.
    #[must_use]
    pub fn system() -> Self {
        Self::new(Box::new(SystemClipboard), Box::new(TerminalClipboard::stdout()))
    }

    /// # Errors
    ///
    /// Returns [`ClipboardError::Exhausted`] when both paths fail.
    pub fn copy(&self, text: &str) -> Result<CopyPath, ClipboardError> {
        let primary = match self.primary.set_text(text) {
            Ok(()) => return Ok(CopyPath::Primary),
            Err(err) => err,
        };
        debug!(error = %primary, "primary clipboard failed; using fallback");
        self.fallback
            .set_text(text)
            .map(|()| CopyPath::Fallback)
            .map_err(|fallback| ClipboardError::Exhausted {
                primary: primary.to_string(),
                fallback: fallback.to_string(),
            })
    }
}
