//! Scheduler statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time view of scheduler activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Items accepted by `submit`.
    pub submitted: u64,
    /// Items that ran to completion without error.
    pub completed: u64,
    /// Items that returned an error or panicked.
    pub failed: u64,
    /// Items waiting in the queue.
    pub pending: usize,
    /// Worker generations started so far.
    pub generations: u64,
    /// Whether a worker is currently alive.
    pub running: bool,
}

impl SchedulerStats {
    /// Items that have been dequeued and executed, successfully or not.
    #[must_use]
    pub const fn executed(&self) -> u64 {
        self.completed + self.failed
    }
}

/// Lock-free counters updated by producers and the worker.
#[derive(Debug, Default)]
pub(crate) struct SchedulerCounters {
    pub submitted: AtomicU64,
    pub completed: AtomicU64,
    pub failed: AtomicU64,
}

impl SchedulerCounters {
    pub fn snapshot(&self, pending: usize, generations: u64, running: bool) -> SchedulerStats {
        SchedulerStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            pending,
            generations,
            running,
        }
    }
}
