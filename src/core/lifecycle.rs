//! Single-worker lifecycle control.
//!
//! The lifecycle is an atomic state machine
//! `Idle -> Spawning -> Running -> Idle` plus a mutex-guarded slot describing
//! the current worker generation. Producers race on a compare-and-swap out of
//! `Idle`; only the winner may start a thread, which keeps at most one worker
//! alive. Waiters block on a `Condvar` paired with the slot.
//!
//! Store/load pairs that decide whether a queued item has an owner use
//! `SeqCst`: a producer pushes then reads the state, the exiting worker
//! writes `Idle` then re-reads the queue, and at least one of them must see
//! the other's write.

use std::sync::atomic::{fence, AtomicU8, Ordering};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::debug;

/// Observable worker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LifecycleState {
    Idle,
    Spawning,
    Running,
}

impl LifecycleState {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Spawning => 1,
            Self::Running => 2,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Spawning,
            2 => Self::Running,
            _ => Self::Idle,
        }
    }
}

/// Bookkeeping for the most recent worker generation.
#[derive(Debug, Default)]
struct WorkerSlot {
    /// Generation of the most recently started worker (0 = none yet).
    generation: u64,
    /// Whether that worker has not yet finished.
    active: bool,
}

pub(crate) struct WorkerLifecycle {
    state: AtomicU8,
    slot: Mutex<WorkerSlot>,
    finished: Condvar,
}

impl WorkerLifecycle {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(LifecycleState::Idle.as_u8()),
            slot: Mutex::new(WorkerSlot::default()),
            finished: Condvar::new(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Lock-free pre-check used before attempting a spawn.
    pub fn is_idle(&self) -> bool {
        self.state() == LifecycleState::Idle
    }

    /// Claim the right to start a worker and run `spawn` for the new
    /// generation.
    ///
    /// Returns `Ok(None)` when another producer (or the current worker) owns
    /// the lifecycle, and `Ok(Some(generation))` after `spawn` succeeded. On
    /// failure the lifecycle goes back to `Idle` and the error is returned.
    pub fn try_spawn<F, E>(&self, spawn: F) -> Result<Option<u64>, E>
    where
        F: FnOnce(u64) -> Result<(), E>,
    {
        if self
            .state
            .compare_exchange(
                LifecycleState::Idle.as_u8(),
                LifecycleState::Spawning.as_u8(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            return Ok(None);
        }

        let mut slot = self.slot.lock();
        let generation = slot.generation + 1;
        // Running must be visible before the thread exists: the worker's exit
        // transition assumes it owns the Running state.
        self.state
            .store(LifecycleState::Running.as_u8(), Ordering::SeqCst);

        match spawn(generation) {
            Ok(()) => {
                slot.generation = generation;
                slot.active = true;
                // Waiters tracking the previous generation are done with it.
                self.finished.notify_all();
                debug!(generation = generation, "Worker generation started");
                Ok(Some(generation))
            }
            Err(err) => {
                self.state
                    .store(LifecycleState::Idle.as_u8(), Ordering::SeqCst);
                Err(err)
            }
        }
    }

    /// Called by worker `generation` after it observed an empty queue.
    ///
    /// Publishes `Idle`, then re-checks `has_work`. If work raced in and this
    /// worker wins the lifecycle back, it must keep draining (returns `true`).
    /// A worker that has been superseded by a newer generation never reclaims.
    pub fn release(&self, generation: u64, has_work: impl Fn() -> bool) -> bool {
        self.state
            .store(LifecycleState::Idle.as_u8(), Ordering::SeqCst);
        fence(Ordering::SeqCst);

        if !has_work() {
            return false;
        }
        let slot = self.slot.lock();
        if slot.generation != generation {
            return false;
        }
        self.state
            .compare_exchange(
                LifecycleState::Idle.as_u8(),
                LifecycleState::Running.as_u8(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    /// Mark `generation` as finished and wake waiters.
    pub fn finish(&self, generation: u64) {
        let mut slot = self.slot.lock();
        if slot.generation == generation {
            slot.active = false;
        }
        self.finished.notify_all();
    }

    /// Block until the currently tracked generation has finished.
    pub fn wait(&self) {
        let mut slot = self.slot.lock();
        let generation = slot.generation;
        self.finished
            .wait_while(&mut slot, |s| s.active && s.generation == generation);
    }

    /// Like [`wait`](Self::wait) with an upper bound; `true` if the tracked
    /// worker finished (or none was running).
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let mut slot = self.slot.lock();
        let generation = slot.generation;
        !self
            .finished
            .wait_while_for(
                &mut slot,
                |s| s.active && s.generation == generation,
                timeout,
            )
            .timed_out()
    }

    pub fn generations(&self) -> u64 {
        self.slot.lock().generation
    }
}

/// Fence helper for producers: orders the queue push before the state read.
pub(crate) fn publish_push() {
    fence(Ordering::SeqCst);
}
