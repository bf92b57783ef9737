//! # Emote Batch
//!
//! Rate-limited, bounded-concurrency batch tagging of emote images with a
//! vision model.
//!
//! A batch is a list of image paths. Each one becomes a [`core::WorkItem`]
//! and is pushed through a fixed pipeline:
//!
//! - **Token bucket** ([`core::TokenBucket`]): up to `C` immediate
//!   admissions, then one every `60s / C`. Paces calls to the remote API.
//! - **Bounded dispatcher** ([`core::BoundedDispatcher`]): at most
//!   `max_concurrent` items are processed at once.
//! - **Processor** ([`core::ItemProcessor`]): the per-item work. The
//!   production processor ([`emote::EmoteProcessor`]) renders the image at
//!   full size and at 28×28, asks the vision model for a structured
//!   description, and stores renditions plus a JSON record.
//! - **Collector** ([`core::ResultCollector`]): a finite stream of
//!   per-item results in completion order. It ends only once every item has
//!   been delivered.
//!
//! Every input yields exactly one result. Failures, panics included, are
//! reported on the result and never stop the batch.
//!
//! ```rust,ignore
//! use emote_batch::builders::PipelineBuilder;
//! use emote_batch::config::BatchConfig;
//! use emote_batch::core::WorkItem;
//! use emote_batch::runtime::TokioSpawner;
//!
//! let config = BatchConfig::from_env();
//! let driver = PipelineBuilder::new("emotes", config).build_emote_driver(TokioSpawner::current())?;
//! let mut results = driver.dispatch(WorkItem::from_paths(["a.png", "b.gif"]))?;
//! while let Some(result) = results.next().await {
//!     println!("{}: {:?}", result.source.display(), result.error_message());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Rate limiter, dispatcher, lifecycle handshake and result collection.
pub mod core;
/// Configuration models and loading.
pub mod config;
/// Builders to construct pipelines from configuration.
pub mod builders;
/// Emote description model and processor.
pub mod emote;
/// Infrastructure adapters for images, the vision API and storage.
pub mod infra;
/// Runtime adapters and the output stage.
pub mod runtime;
/// Shared utilities.
pub mod util;
