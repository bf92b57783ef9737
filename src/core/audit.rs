//! Pipeline event sinks.
//!
//! The driver records when each item is admitted by the limiter, when its
//! task starts executing, and when its result has been delivered. Sinks are
//! optional; the in-memory sink keeps a bounded ring of the latest events and
//! is what the timing and concurrency tests inspect.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::time::Instant;

/// What happened to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The item acquired a limiter token.
    Admitted,
    /// The item's task acquired a slot and began processing.
    Started,
    /// The item's result was delivered to the collector.
    Finished,
}

/// A timestamped pipeline event.
#[derive(Debug, Clone)]
pub struct PipelineEvent {
    /// Index of the work item.
    pub index: usize,
    /// Event kind.
    pub kind: EventKind,
    /// When it happened (tokio clock, so paused-time tests see virtual time).
    pub at: Instant,
}

impl PipelineEvent {
    /// Build an event stamped with the current time.
    #[must_use]
    pub fn now(index: usize, kind: EventKind) -> Self {
        Self {
            index,
            kind,
            at: Instant::now(),
        }
    }
}

/// Event sink abstraction.
pub trait EventSink: Send + Sync {
    /// Record an event.
    fn record(&self, event: PipelineEvent);
}

/// In-memory event sink with a bounded buffer.
#[derive(Debug, Clone)]
pub struct InMemoryEventSink {
    events: Arc<Mutex<VecDeque<PipelineEvent>>>,
    max_events: usize,
}

impl InMemoryEventSink {
    /// Create a sink keeping at most `max_events` events.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(max_events.min(1024)))),
            max_events,
        }
    }

    /// Snapshot of stored events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Timestamps of events of `kind`, in recording order.
    #[must_use]
    pub fn times_of(&self, kind: EventKind) -> Vec<Instant> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.at)
            .collect()
    }
}

impl EventSink for InMemoryEventSink {
    fn record(&self, event: PipelineEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Sink that forwards events to `tracing` at trace level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn record(&self, event: PipelineEvent) {
        tracing::trace!(index = event.index, kind = ?event.kind, "pipeline event");
    }
}
