//! Fan-in collection of per-item results.
//!
//! Tasks hand their result to a [`ResultSink`]; the single consumer drains a
//! [`ResultCollector`]. The stream ends when every sink has been dropped,
//! which the driver arranges to happen only after the outstanding-work count
//! reaches zero.

use tokio::sync::mpsc;
use tracing::warn;

use crate::core::ItemResult;

/// Create a connected sink/collector pair with room for `capacity` results.
///
/// A capacity of at least the batch size means delivery never waits on the
/// consumer.
#[must_use]
pub fn result_channel<T>(capacity: usize) -> (ResultSink<T>, ResultCollector<T>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        ResultSink { tx },
        ResultCollector {
            rx,
            delivered: 0,
            exhausted: false,
        },
    )
}

/// Producer half: hands results to the collector.
#[derive(Debug)]
pub struct ResultSink<T> {
    tx: mpsc::Sender<ItemResult<T>>,
}

impl<T> Clone for ResultSink<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> ResultSink<T> {
    /// Deliver one result, transferring ownership to the collector.
    ///
    /// If the consumer has gone away the result is dropped and logged.
    pub async fn deliver(&self, result: ItemResult<T>) {
        let index = result.index;
        if self.tx.send(result).await.is_err() {
            warn!(index = index, "result collector dropped; discarding result");
        }
    }
}

/// Consumer half: a finite, non-restartable stream of results in
/// completion order.
#[derive(Debug)]
pub struct ResultCollector<T> {
    rx: mpsc::Receiver<ItemResult<T>>,
    delivered: usize,
    exhausted: bool,
}

impl<T> ResultCollector<T> {
    /// Next completed result, or `None` once the batch is complete.
    pub async fn next(&mut self) -> Option<ItemResult<T>> {
        if self.exhausted {
            return None;
        }
        if let Some(result) = self.rx.recv().await {
            self.delivered += 1;
            Some(result)
        } else {
            self.exhausted = true;
            None
        }
    }

    /// Results handed out so far.
    #[must_use]
    pub const fn delivered(&self) -> usize {
        self.delivered
    }

    /// Whether the completion signal has been observed.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Drain every remaining result in completion order.
    pub async fn collect_all(mut self) -> Vec<ItemResult<T>> {
        let mut results = Vec::new();
        while let Some(result) = self.next().await {
            results.push(result);
        }
        results
    }

    /// Drain every remaining result and sort by input index.
    pub async fn collect_ordered(self) -> Vec<ItemResult<T>> {
        let mut results = self.collect_all().await;
        results.sort_by_key(|r| r.index);
        results
    }
}
