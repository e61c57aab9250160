//! Session state: the selected artifact and the last generated secret.
//!
//! DESIGN
//! ======
//! A [`Session`] is created once per front end and passed by reference to the
//! dispatcher and the password panel. Both slots hold immutable values behind
//! `Arc` and are replaced wholesale; nothing is ever mutated in place, so a
//! reader that cloned the current artifact keeps a consistent view while a new
//! selection lands. Locks are std and never held across an await.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use crate::services::{Feedback, Severity};
use crate::util::format::format_size;

// =============================================================================
// SELECTED ARTIFACT
// =============================================================================

/// A local file chosen as input for the upload operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedArtifact {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: Option<String>,
    pub bytes: Arc<[u8]>,
}

impl SelectedArtifact {
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes = bytes.into();
        Self { name: name.into(), size_bytes: bytes.len() as u64, mime_type: None, bytes }
    }

    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Read `path` into memory. The name is the final path component.
    ///
    /// # Errors
    ///
    /// Returns the read error, or `InvalidInput` when the path has no file
    /// name component.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("{} does not name a file", path.display()),
                )
            })?;
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(name, bytes))
    }

    /// Three-line description shown after selection.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}\nSize: {}\nType: {}",
            self.name,
            format_size(self.size_bytes),
            self.mime_type.as_deref().unwrap_or("Unknown")
        )
    }
}

// =============================================================================
// SELECTION STORE
// =============================================================================

/// Holds zero or one artifact.
#[derive(Default)]
pub struct SelectionStore {
    current: RwLock<Option<Arc<SelectedArtifact>>>,
}

impl SelectionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection unconditionally and return its summary.
    pub fn select(&self, artifact: SelectedArtifact) -> String {
        let summary = artifact.summary();
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(artifact));
        summary
    }

    #[must_use]
    pub fn current(&self) -> Option<Arc<SelectedArtifact>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.read().unwrap_or_else(PoisonError::into_inner).is_none()
    }
}

// =============================================================================
// GENERATED SECRET
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedSecret {
    pub value: String,
    pub strength_label: String,
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Default)]
pub struct Session {
    pub selection: SelectionStore,
    secret: RwLock<Option<Arc<GeneratedSecret>>>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `artifact` and announce it on both feedback channels.
    pub fn select_artifact(&self, artifact: SelectedArtifact, feedback: &Feedback) -> String {
        let name = artifact.name.clone();
        let size = format_size(artifact.size_bytes);
        let summary = self.selection.select(artifact);
        feedback.log.info(format!("File selected: {name} ({size})"));
        feedback
            .notifications
            .push(Severity::Success, format!("File selected: {name}"));
        summary
    }

    #[must_use]
    pub fn artifact(&self) -> Option<Arc<SelectedArtifact>> {
        self.selection.current()
    }

    /// Supersede the current secret.
    pub fn store_secret(&self, secret: GeneratedSecret) {
        *self.secret.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(secret));
    }

    #[must_use]
    pub fn secret(&self) -> Option<Arc<GeneratedSecret>> {
        self.secret.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
