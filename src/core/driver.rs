//! Batch driver: feeds the limiter and dispatcher and owns the completion
//! handshake.
//!
//! For each item, in input order, the enqueuing loop
//!
//! 1. waits for a limiter token (rate pacing gates admission),
//! 2. waits for a dispatcher slot (the concurrency bound gates execution),
//! 3. registers the task as outstanding work and spawns it.
//!
//! The loop itself is registered as outstanding work *before* it or the
//! coordinator is spawned, and retires only after the last item has been
//! issued. The coordinator closes the result stream once the outstanding
//! count reaches zero, so the consumer can never observe completion while
//! items remain unqueued or results undelivered.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use crate::core::{
    result_channel, BoundedDispatcher, DispatchError, EventKind, EventSink, ItemError,
    ItemProcessor, ItemResult, PipelineEvent, ResultCollector, ResultSink, TokenBucket, WorkGuard,
    WorkItem, WorkTracker,
};

/// Abstraction for spawning task execution on a runtime.
pub trait Spawn {
    /// Spawn a detached future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Everything a batch's background tasks share.
struct BatchContext<P, S> {
    limiter: Arc<TokenBucket>,
    dispatcher: BoundedDispatcher,
    processor: Arc<P>,
    spawner: S,
    events: Option<Arc<dyn EventSink>>,
    tracker: WorkTracker,
}

impl<P, S: Clone> Clone for BatchContext<P, S> {
    fn clone(&self) -> Self {
        Self {
            limiter: Arc::clone(&self.limiter),
            dispatcher: self.dispatcher.clone(),
            processor: Arc::clone(&self.processor),
            spawner: self.spawner.clone(),
            events: self.events.clone(),
            tracker: self.tracker.clone(),
        }
    }
}

impl<P, S> BatchContext<P, S> {
    fn record(&self, index: usize, kind: EventKind) {
        if let Some(sink) = &self.events {
            sink.record(PipelineEvent::now(index, kind));
        }
    }
}

/// Runs batches of work items through the limiter, dispatcher and processor.
pub struct Driver<P, S> {
    limiter: Arc<TokenBucket>,
    dispatcher: BoundedDispatcher,
    processor: Arc<P>,
    spawner: S,
    events: Option<Arc<dyn EventSink>>,
}

impl<P, S> Driver<P, S>
where
    P: ItemProcessor,
    S: Spawn + Clone + Send + Sync + 'static,
{
    /// Create a driver from its components.
    pub fn new(
        limiter: Arc<TokenBucket>,
        dispatcher: BoundedDispatcher,
        processor: P,
        spawner: S,
    ) -> Self {
        Self {
            limiter,
            dispatcher,
            processor: Arc::new(processor),
            spawner,
            events: None,
        }
    }

    /// Attach an event sink.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    /// The limiter shared by every batch this driver runs.
    #[must_use]
    pub const fn limiter(&self) -> &Arc<TokenBucket> {
        &self.limiter
    }

    /// The dispatcher shared by every batch this driver runs.
    #[must_use]
    pub const fn dispatcher(&self) -> &BoundedDispatcher {
        &self.dispatcher
    }

    /// Start a batch and return the stream of its results.
    ///
    /// Returns as soon as the background activities are spawned; results
    /// arrive on the collector in completion order.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::NoItems`] if `items` is empty. Nothing is
    /// spawned in that case.
    pub fn dispatch(
        &self,
        items: Vec<WorkItem>,
    ) -> Result<ResultCollector<P::Payload>, DispatchError> {
        if items.is_empty() {
            return Err(DispatchError::NoItems);
        }

        let batch_id = Uuid::new_v4();
        let total = items.len();
        let span = info_span!("batch", %batch_id, items = total);
        let (sink, collector) = result_channel(total);

        let ctx = BatchContext {
            limiter: Arc::clone(&self.limiter),
            dispatcher: self.dispatcher.clone(),
            processor: Arc::clone(&self.processor),
            spawner: self.spawner.clone(),
            events: self.events.clone(),
            tracker: WorkTracker::new(),
        };

        // Must happen before anything is spawned: the coordinator may not see
        // an idle tracker until the loop has issued every item.
        let loop_guard = ctx.tracker.register();

        span.in_scope(|| {
            info!(
                max_concurrent = ctx.dispatcher.max_concurrent(),
                limiter_capacity = ctx.limiter.capacity(),
                "dispatching batch"
            );
        });

        let tracker = ctx.tracker.clone();
        self.spawner.spawn(
            enqueue_loop(ctx, items, sink.clone(), loop_guard).instrument(span.clone()),
        );

        self.spawner.spawn(
            async move {
                tracker.wait_idle().await;
                // Last sender: dropping it closes the result stream.
                drop(sink);
                info!(tasks = tracker.registered() - 1, "batch complete");
            }
            .instrument(span),
        );

        Ok(collector)
    }

    /// Run a batch to completion and return its results in completion order.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::NoItems`] if `items` is empty.
    pub async fn run(
        &self,
        items: Vec<WorkItem>,
    ) -> Result<Vec<ItemResult<P::Payload>>, DispatchError> {
        Ok(self.dispatch(items)?.collect_all().await)
    }
}

async fn enqueue_loop<P, S>(
    ctx: BatchContext<P, S>,
    items: Vec<WorkItem>,
    sink: ResultSink<P::Payload>,
    loop_guard: WorkGuard,
) where
    P: ItemProcessor,
    S: Spawn + Clone + Send + Sync + 'static,
{
    for item in items {
        ctx.limiter.acquire().await;
        ctx.record(item.index, EventKind::Admitted);
        debug!(index = item.index, "item admitted");

        let slot = ctx.dispatcher.acquire_slot().await;
        let guard = ctx.tracker.register();

        let task_ctx = ctx.clone();
        let task_sink = sink.clone();
        ctx.spawner.spawn(
            async move {
                let index = item.index;
                task_ctx.record(index, EventKind::Started);

                let result = AssertUnwindSafe(task_ctx.processor.process(&item))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| {
                        ItemResult::failed(&item, ItemError::Panicked(panic_message(&*panic)))
                    });

                if let Some(error) = &result.error {
                    warn!(index = index, source = %item.source.display(), error = %error, "item failed");
                } else {
                    debug!(index = index, "item succeeded");
                }

                task_sink.deliver(result).await;
                task_ctx.record(index, EventKind::Finished);

                drop(slot);
                drop(task_sink);
                // Retire last, after the result is in the collector.
                drop(guard);
            }
            .instrument(Span::current()),
        );
    }

    debug!("all items issued");
    drop(sink);
    drop(loop_guard);
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".into())
}
