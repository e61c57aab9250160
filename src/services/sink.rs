//! Save-to-disk target for downloaded artifacts and log exports.

#[cfg(test)]
#[path = "sink_test.rs"]
mod sink_test;

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

/// Numbered variants tried before giving up on a crowded directory.
const MAX_NUMBERED_VARIANTS: u32 = 9999;

/// Destination for bytes the user asked to keep.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Store `bytes` under `name` and return where they ended up.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the name is unusable or the write fails.
    async fn save(&self, name: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

/// Writes into a fixed directory, creating it on first use.
///
/// Existing files are never replaced. A taken name gets a numbered variant,
/// `plain.txt` then `plain (1).txt`, `plain (2).txt` and so on.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// `stem (n).ext`, or `stem (n)` when there is no extension.
#[must_use]
pub fn numbered_name(file_name: &str, n: u32) -> String {
    let path = Path::new(file_name);
    let stem = path.file_stem().map_or_else(|| file_name.into(), |s| s.to_string_lossy());
    match path.extension() {
        Some(ext) => format!("{stem} ({n}).{}", ext.to_string_lossy()),
        None => format!("{stem} ({n})"),
    }
}

#[async_trait]
impl ArtifactSink for DirectorySink {
    async fn save(&self, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        // Names come from user files and service headers; keep only the last component.
        let file_name = Path::new(name)
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("unusable file name: {name:?}")))?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let candidates =
            std::iter::once(file_name.clone()).chain((1..=MAX_NUMBERED_VARIANTS).map(|n| numbered_name(&file_name, n)));
        for candidate in candidates {
            let path = self.dir.join(&candidate);
            let mut file = match tokio::fs::OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => file,
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err),
            };
            file.write_all(bytes).await?;
            file.flush().await?;
            return Ok(path);
        }
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free name for {file_name:?} in {}", self.dir.display()),
        ))
    }
}
