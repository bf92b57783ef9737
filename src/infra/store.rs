//! Artifact storage for renditions and description records.

use std::path::{Path, PathBuf};

use crate::core::ItemError;

/// Destination for files produced while processing an item.
pub trait ArtifactStore: Send + Sync + 'static {
    /// Write `bytes` under `name` and return the path written.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::Io`] if the write fails.
    fn put(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, ItemError>;
}

/// Stores artifacts as plain files under a root directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactStore for FsStore {
    fn put(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, ItemError> {
        if !self.root.as_os_str().is_empty() {
            std::fs::create_dir_all(&self.root)?;
        }
        let path = self.root.join(sanitize_file_name(name));
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

/// Make a model-suggested name safe to use as a single path component.
///
/// Path separators and control characters become `_`, and leading dots are
/// stripped so the name cannot climb out of the store or hide itself.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}
