//! Error types for dispatch and per-item processing.

use thiserror::Error;

use crate::infra::vision::VisionError;

/// Errors produced while setting up or starting a batch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The batch was started with no work items.
    #[error("no work items supplied")]
    NoItems,
    /// A limiter or dispatcher bound was zero.
    #[error("invalid bound: {0}")]
    InvalidBound(String),
}

/// Failure detail carried by a failed [`ItemResult`](crate::core::ItemResult).
#[derive(Debug, Error)]
pub enum ItemError {
    /// The input could not be decoded or failed validation.
    #[error("decode error: {0}")]
    Decode(String),
    /// A rendition could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),
    /// Reading or writing a file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The external vision call failed.
    #[error(transparent)]
    Vision(#[from] VisionError),
    /// The processor panicked; the payload message is preserved.
    #[error("processor panicked: {0}")]
    Panicked(String),
    /// A blocking helper task was cancelled or panicked.
    #[error("background task failed: {0}")]
    Join(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
