//! Outstanding-work registry gating the batch completion signal.
//!
//! Every unit of work that may still produce a result holds a [`WorkGuard`].
//! Registering increments the outstanding count; dropping the guard retires
//! it. [`WorkTracker::wait_idle`] resolves once the count is zero.
//!
//! Because a guard can only be obtained by registering and only retires in
//! its own `Drop`, the count can never go negative. The enqueuing loop holds
//! a guard for its whole run, so the count cannot touch zero while items are
//! still being issued.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct TrackerState {
    outstanding: AtomicUsize,
    registered: AtomicU64,
    idle: Notify,
}

/// Reference-counted registry of outstanding work.
#[derive(Debug, Clone, Default)]
pub struct WorkTracker {
    state: Arc<TrackerState>,
}

impl WorkTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one unit of outstanding work.
    #[must_use = "dropping the guard immediately retires the work"]
    pub fn register(&self) -> WorkGuard {
        self.state.outstanding.fetch_add(1, Ordering::AcqRel);
        self.state.registered.fetch_add(1, Ordering::Relaxed);
        WorkGuard {
            state: Arc::clone(&self.state),
        }
    }

    /// Units currently registered and not yet retired.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.state.outstanding.load(Ordering::Acquire)
    }

    /// Total registrations over the tracker's lifetime.
    #[must_use]
    pub fn registered(&self) -> u64 {
        self.state.registered.load(Ordering::Relaxed)
    }

    /// Wait until no outstanding work remains.
    ///
    /// Resolves immediately if the count is already zero, so callers must
    /// register before anyone waits.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.state.idle.notified();
            tokio::pin!(notified);
            // Arm the waiter before checking, so a retire between the check
            // and the await is not missed.
            notified.as_mut().enable();
            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Registration handle for one unit of outstanding work.
#[derive(Debug)]
pub struct WorkGuard {
    state: Arc<TrackerState>,
}

impl Drop for WorkGuard {
    fn drop(&mut self) {
        let previous = self.state.outstanding.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "outstanding work count underflow");
        if previous == 1 {
            self.state.idle.notify_waiters();
        }
    }
}
