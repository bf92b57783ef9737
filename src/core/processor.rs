//! Per-item processing trait.

use async_trait::async_trait;

use crate::core::{ItemResult, WorkItem};

/// The unit of work run once per [`WorkItem`].
///
/// Implementations must be safe to run concurrently with any number of other
/// invocations and must always return a result: failures are reported through
/// [`ItemResult::error`], never by panicking. The driver still catches panics
/// and turns them into failed results so that slot release and delivery are
/// never skipped.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use emote_batch::core::{ItemProcessor, ItemResult, WorkItem};
///
/// struct FileSize;
///
/// #[async_trait]
/// impl ItemProcessor for FileSize {
///     type Payload = u64;
///
///     async fn process(&self, item: &WorkItem) -> ItemResult<u64> {
///         match tokio::fs::metadata(&item.source).await {
///             Ok(meta) => ItemResult::succeeded(item, meta.len()),
///             Err(e) => ItemResult::failed(item, e.into()),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait ItemProcessor: Send + Sync + 'static {
    /// Success payload produced for an item.
    type Payload: Send + 'static;

    /// Process one item.
    async fn process(&self, item: &WorkItem) -> ItemResult<Self::Payload>;
}
