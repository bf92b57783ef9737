//! Token-bucket limiter pacing admissions to the external service.
//!
//! The reservoir is a tokio [`Semaphore`] whose permits are the tokens. It is
//! created full, so up to `capacity` admissions proceed without waiting. A
//! background refill task adds one token per interval, but only while the
//! reservoir is below capacity: a full bucket banks nothing.
//!
//! While the bucket is full the refill clock is parked. The first acquire
//! from a full bucket restarts it, so the next token arrives one whole
//! interval after that admission no matter how long the bucket sat idle.
//! A limiter reused across batches paces the second batch like the first.
//!
//! Only the refill task ever adds permits and acquirers only ever remove them,
//! so the `available < capacity` check in the refill task cannot race past the
//! capacity.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{watch, Notify, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::core::DispatchError;

/// Token bucket with an owned, stoppable refill task.
///
/// Must be constructed from within a tokio runtime.
pub struct TokenBucket {
    capacity: usize,
    interval: Duration,
    tokens: Arc<Semaphore>,
    consumed: Arc<Notify>,
    stop_tx: watch::Sender<bool>,
    refill: Mutex<Option<JoinHandle<()>>>,
}

impl TokenBucket {
    /// Create a bucket admitting `rate` operations per minute.
    ///
    /// Capacity is `rate` and one token is added every `60s / rate`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidBound`] if `rate` is zero.
    pub fn per_minute(rate: u32) -> Result<Self, DispatchError> {
        if rate == 0 {
            return Err(DispatchError::InvalidBound(
                "rate per minute must be greater than 0".into(),
            ));
        }
        Self::with_interval(rate as usize, Duration::from_secs(60) / rate)
    }

    /// Create a bucket with an explicit capacity and refill interval.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidBound`] if either value is zero.
    pub fn with_interval(capacity: usize, interval: Duration) -> Result<Self, DispatchError> {
        if capacity == 0 {
            return Err(DispatchError::InvalidBound(
                "limiter capacity must be greater than 0".into(),
            ));
        }
        if interval.is_zero() {
            return Err(DispatchError::InvalidBound(
                "refill interval must be greater than 0".into(),
            ));
        }

        let tokens = Arc::new(Semaphore::new(capacity));
        let consumed = Arc::new(Notify::new());
        let (stop_tx, stop_rx) = watch::channel(false);
        let refill = tokio::spawn(refill_loop(
            Arc::clone(&tokens),
            Arc::clone(&consumed),
            capacity,
            interval,
            stop_rx,
        ));

        info!(
            capacity = capacity,
            interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            "token bucket started"
        );

        Ok(Self {
            capacity,
            interval,
            tokens,
            consumed,
            stop_tx,
            refill: Mutex::new(Some(refill)),
        })
    }

    /// Wait for a token and consume it.
    ///
    /// Never fails and never times out. Waiters are served first come, first
    /// served.
    pub async fn acquire(&self) {
        match self.tokens.acquire().await {
            // The token is consumed, not returned on drop.
            Ok(permit) => {
                permit.forget();
                self.consumed.notify_one();
            }
            // The semaphore is never closed while `self` is alive.
            Err(_) => unreachable!("token reservoir closed"),
        }
    }

    /// Tokens currently in the reservoir.
    #[must_use]
    pub fn available(&self) -> usize {
        self.tokens.available_permits()
    }

    /// Maximum reservoir size (burst size).
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Interval between refill ticks.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Stop the refill task and wait for it to exit.
    ///
    /// Tokens already in the reservoir remain acquirable. Calling this more
    /// than once is a no-op.
    pub async fn stop(&self) {
        let _ = self.stop_tx.send(true);
        let handle = self.refill.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
            debug!("token bucket refill stopped");
        }
    }

    /// Whether the refill task is still running.
    #[must_use]
    pub fn is_refilling(&self) -> bool {
        self.refill.lock().as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for TokenBucket {
    fn drop(&mut self) {
        if let Some(handle) = self.refill.get_mut().take() {
            handle.abort();
        }
    }
}

async fn refill_loop(
    tokens: Arc<Semaphore>,
    consumed: Arc<Notify>,
    capacity: usize,
    period: Duration,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let full = tokens.available_permits() >= capacity;
        tokio::select! {
            // Parked until a token is taken from the full bucket.
            () = consumed.notified(), if full => {
                ticker.reset();
            }
            _ = ticker.tick(), if !full => {
                if tokens.available_permits() < capacity {
                    tokens.add_permits(1);
                }
            }
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
        }
    }
}
