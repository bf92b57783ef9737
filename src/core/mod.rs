//! Rate-limited, bounded-concurrency dispatch core.

pub mod audit;
pub mod collector;
pub mod dispatcher;
pub mod driver;
pub mod error;
pub mod item;
pub mod limiter;
pub mod processor;
pub mod tracker;

pub use audit::{EventKind, EventSink, InMemoryEventSink, PipelineEvent, TracingEventSink};
pub use collector::{result_channel, ResultCollector, ResultSink};
pub use dispatcher::{BoundedDispatcher, DispatcherStats, Slot};
pub use driver::{Driver, Spawn};
pub use error::{AppResult, DispatchError, ItemError};
pub use item::{ItemResult, WorkItem};
pub use limiter::TokenBucket;
pub use processor::ItemProcessor;
pub use tracker::{WorkGuard, WorkTracker};
