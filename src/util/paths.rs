//! Serde helpers that write paths as strings.
//!
//! Paths are not required to be UTF-8. Invalid sequences are replaced with
//! U+FFFD so a record is always written in full.

use std::path::{Path, PathBuf};

use serde::Serializer;

/// Serialize one path with `to_string_lossy`.
///
/// # Errors
///
/// Propagates the serializer's error.
pub fn serialize_lossy<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

/// Serialize a list of paths with `to_string_lossy`.
///
/// # Errors
///
/// Propagates the serializer's error.
pub fn serialize_lossy_seq<S: Serializer>(
    paths: &[PathBuf],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(paths.iter().map(|p| p.to_string_lossy()))
}
