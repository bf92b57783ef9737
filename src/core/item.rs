//! Work items and their per-item results.

use std::path::{Path, PathBuf};

use crate::core::ItemError;

/// One input to the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Position in the input list; correlates the item with its result.
    pub index: usize,
    /// Source path of the input file.
    pub source: PathBuf,
}

impl WorkItem {
    /// Create a work item.
    pub fn new(index: usize, source: impl Into<PathBuf>) -> Self {
        Self {
            index,
            source: source.into(),
        }
    }

    /// Build work items from an ordered list of paths.
    pub fn from_paths<I, P>(paths: I) -> Vec<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        paths
            .into_iter()
            .enumerate()
            .map(|(index, path)| Self::new(index, path))
            .collect()
    }
}

/// Output record for one work item.
///
/// A result carries a payload, an error, or both: a processor that got a
/// payload back but failed while persisting it keeps the payload and the
/// artifacts written so far alongside the error.
#[derive(Debug)]
pub struct ItemResult<T> {
    /// Index of the originating [`WorkItem`].
    pub index: usize,
    /// Source path of the originating item.
    pub source: PathBuf,
    /// Success payload, if one was produced.
    pub payload: Option<T>,
    /// Files produced for this item.
    pub artifacts: Vec<PathBuf>,
    /// Failure detail; `None` on success.
    pub error: Option<ItemError>,
}

impl<T> ItemResult<T> {
    /// Start an empty result for `item`.
    #[must_use]
    pub fn for_item(item: &WorkItem) -> Self {
        Self {
            index: item.index,
            source: item.source.clone(),
            payload: None,
            artifacts: Vec::new(),
            error: None,
        }
    }

    /// A successful result carrying `payload`.
    #[must_use]
    pub fn succeeded(item: &WorkItem, payload: T) -> Self {
        Self::for_item(item).with_payload(payload)
    }

    /// A failed result carrying `error`.
    #[must_use]
    pub fn failed(item: &WorkItem, error: ItemError) -> Self {
        Self::for_item(item).with_error(error)
    }

    /// Set the payload.
    #[must_use]
    pub fn with_payload(mut self, payload: T) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Set the error.
    #[must_use]
    pub fn with_error(mut self, error: ItemError) -> Self {
        self.error = Some(error);
        self
    }

    /// Record a produced file.
    pub fn push_artifact(&mut self, path: impl AsRef<Path>) {
        self.artifacts.push(path.as_ref().to_path_buf());
    }

    /// Whether the item completed without error.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Human-readable error detail, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}
