//! Bounded dispatcher capping the number of simultaneously running tasks.
//!
//! Slots are permits of a tokio [`Semaphore`] sized to `max_concurrent`. A
//! [`Slot`] owns its permit and releases it when dropped, so the release is
//! paired with the acquire on every exit path, unwinding included.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::core::DispatchError;

/// Snapshot of dispatcher utilisation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatcherStats {
    /// Configured concurrency bound.
    pub max_concurrent: usize,
    /// Slots currently held.
    pub active: usize,
    /// Highest number of slots held at once.
    pub peak_active: usize,
    /// Total slots handed out.
    pub acquired: u64,
    /// Total slots released.
    pub released: u64,
}

/// Lock-free counters shared between the dispatcher and its slots.
#[derive(Debug, Default)]
struct SlotCounters {
    active: AtomicUsize,
    peak_active: AtomicUsize,
    acquired: AtomicU64,
    released: AtomicU64,
}

impl SlotCounters {
    fn on_acquire(&self) {
        let current = self.active.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_active.fetch_max(current, Ordering::AcqRel);
        self.acquired.fetch_add(1, Ordering::Relaxed);
    }

    fn on_release(&self) {
        self.active.fetch_sub(1, Ordering::AcqRel);
        self.released.fetch_add(1, Ordering::Relaxed);
    }
}

/// Caps in-flight work at `max_concurrent` slots.
#[derive(Debug, Clone)]
pub struct BoundedDispatcher {
    max_concurrent: usize,
    slots: Arc<Semaphore>,
    counters: Arc<SlotCounters>,
}

impl BoundedDispatcher {
    /// Create a dispatcher allowing `max_concurrent` slots.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidBound`] if `max_concurrent` is zero.
    pub fn new(max_concurrent: usize) -> Result<Self, DispatchError> {
        if max_concurrent == 0 {
            return Err(DispatchError::InvalidBound(
                "max_concurrent must be greater than 0".into(),
            ));
        }
        Ok(Self {
            max_concurrent,
            slots: Arc::new(Semaphore::new(max_concurrent)),
            counters: Arc::new(SlotCounters::default()),
        })
    }

    /// Wait until fewer than `max_concurrent` slots are held, then take one.
    pub async fn acquire_slot(&self) -> Slot {
        let permit = match Arc::clone(&self.slots).acquire_owned().await {
            Ok(permit) => permit,
            // The semaphore is never closed.
            Err(_) => unreachable!("dispatcher slots closed"),
        };
        self.counters.on_acquire();
        debug!(
            active = self.counters.active.load(Ordering::Relaxed),
            max_concurrent = self.max_concurrent,
            "slot acquired"
        );
        Slot {
            _permit: permit,
            counters: Arc::clone(&self.counters),
        }
    }

    /// Slots currently free.
    #[must_use]
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }

    /// Configured bound.
    #[must_use]
    pub const fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Current utilisation snapshot.
    #[must_use]
    pub fn stats(&self) -> DispatcherStats {
        DispatcherStats {
            max_concurrent: self.max_concurrent,
            active: self.counters.active.load(Ordering::Acquire),
            peak_active: self.counters.peak_active.load(Ordering::Acquire),
            acquired: self.counters.acquired.load(Ordering::Relaxed),
            released: self.counters.released.load(Ordering::Relaxed),
        }
    }
}

/// A held dispatcher slot. Dropping it frees the slot.
#[derive(Debug)]
pub struct Slot {
    _permit: OwnedSemaphorePermit,
    counters: Arc<SlotCounters>,
}

impl Drop for Slot {
    fn drop(&mut self) {
        // Counters first: the permit field is dropped after this body runs.
        self.counters.on_release();
    }
}
