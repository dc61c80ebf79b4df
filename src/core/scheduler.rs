//! Sequential scheduler: many producers, one lazily spawned worker.
//!
//! Producers push onto the pending queue and then try to start a worker.
//! A worker drains the queue in FIFO order, one item at a time, and exits
//! once it observes the queue empty. The next submission after that starts a
//! new worker *generation*.
//!
//! # Design
//!
//! - **Lock-free fast path**: producers only touch the channel and an atomic
//!   state while a worker is already draining
//! - **Single winner**: a compare-and-swap out of `Idle` decides which
//!   producer starts the next worker
//! - **No stranded items**: an exiting worker re-checks the queue after
//!   publishing `Idle` and resumes if a submission raced its exit
//! - **Fault isolation**: errors and panics are caught per item and recorded

use std::convert::Infallible;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SchedulerConfig;

use super::error::SchedulerError;
use super::fault_log::{AggregateFault, Fault, FaultKind, FaultLog};
use super::lifecycle::{publish_push, LifecycleState, WorkerLifecycle};
use super::pending_queue::PendingQueue;
use super::stats::{SchedulerCounters, SchedulerStats};
use super::work_item::{QueuedTask, TaskId, WorkItem};

/// State shared between scheduler handles and the worker thread.
struct Inner {
    id: Uuid,
    config: SchedulerConfig,
    queue: PendingQueue,
    faults: FaultLog,
    lifecycle: WorkerLifecycle,
    counters: SchedulerCounters,
    next_task_id: AtomicU64,
}

/// Executes submitted work items strictly one at a time, in submission order.
///
/// `Scheduler` is a cheap handle: clones share the same queue, worker and
/// fault log, so it can be handed to any number of producer threads.
/// Dropping the last handle does not abandon queued work; a running worker
/// finishes draining before it exits.
///
/// ```
/// use std::sync::Arc;
/// use parking_lot::Mutex;
/// use sequential_scheduler::Scheduler;
///
/// let scheduler = Scheduler::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// for tag in ["1", "2", "3"] {
///     let seen = Arc::clone(&seen);
///     scheduler.submit_fn(move || seen.lock().push(tag)).unwrap();
/// }
///
/// scheduler.wait();
/// assert_eq!(*seen.lock(), vec!["1", "2", "3"]);
/// assert!(scheduler.faults().is_none());
/// ```
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Scheduler {
    /// Create a scheduler with the default configuration.
    ///
    /// No thread is started until the first submission.
    #[must_use]
    pub fn new() -> Self {
        Self::build(SchedulerConfig::default())
    }

    /// Create a scheduler with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidConfig` if the configuration is invalid.
    pub fn with_config(config: SchedulerConfig) -> Result<Self, SchedulerError> {
        config.validate().map_err(SchedulerError::InvalidConfig)?;
        Ok(Self::build(config))
    }

    fn build(config: SchedulerConfig) -> Self {
        let id = Uuid::new_v4();
        info!(
            scheduler = %id,
            thread_name = %config.thread_name,
            stack_size = ?config.stack_size,
            "Sequential scheduler initialized"
        );
        Self {
            inner: Arc::new(Inner {
                id,
                config,
                queue: PendingQueue::new(),
                faults: FaultLog::new(),
                lifecycle: WorkerLifecycle::new(),
                counters: SchedulerCounters::default(),
                next_task_id: AtomicU64::new(0),
            }),
        }
    }

    /// Queue a work item and make sure a worker will run it.
    ///
    /// Never blocks on the work itself. Returns the id assigned to the item,
    /// which is also carried by its [`Fault`] if it fails.
    ///
    /// If the worker thread cannot be started the item is still accepted: it
    /// stays queued, the failure is logged at `warn`, and the next `submit`
    /// or [`wait`](Self::wait) retries the spawn.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::EmptyWorkItem` if `work` is empty; nothing is
    /// queued.
    pub fn submit(&self, work: WorkItem) -> Result<TaskId, SchedulerError> {
        let job = work.into_job().ok_or(SchedulerError::EmptyWorkItem)?;

        let task_id = self.inner.next_task_id.fetch_add(1, Ordering::Relaxed);
        self.inner.queue.push(QueuedTask { id: task_id, job });
        self.inner.counters.submitted.fetch_add(1, Ordering::Relaxed);
        debug!(scheduler = %self.inner.id, task_id = task_id, "Task submitted");

        if self.inner.ensure_worker().is_err() {
            debug!(
                scheduler = %self.inner.id,
                task_id = task_id,
                "Task left queued for the next spawn attempt"
            );
        }
        Ok(task_id)
    }

    /// Queue an infallible closure. See [`submit`](Self::submit).
    ///
    /// # Errors
    ///
    /// None in practice: a closure is never an empty work item.
    pub fn submit_fn<F>(&self, f: F) -> Result<TaskId, SchedulerError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(WorkItem::new(f))
    }

    /// Queue a closure whose error is recorded as a fault.
    /// See [`submit`](Self::submit).
    ///
    /// # Errors
    ///
    /// None in practice: a closure is never an empty work item.
    pub fn submit_fallible<F>(&self, f: F) -> Result<TaskId, SchedulerError>
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        self.submit(WorkItem::fallible(f))
    }

    /// Block until the currently tracked worker has finished.
    ///
    /// Returns immediately if no worker was ever started or the last one has
    /// already exited. With a single producer every item submitted before the
    /// call has run by the time it returns. Concurrent producers may hand the
    /// remaining work to a new generation, so callers that need the queue
    /// fully drained should loop until [`is_running`](Self::is_running) is
    /// false and [`pending`](Self::pending) is zero.
    ///
    /// Queued items left without a worker by a failed spawn are picked up
    /// here: the spawn is retried, and if it fails again the calling thread
    /// drains the queue itself, still one item at a time.
    pub fn wait(&self) {
        self.inner.wait();
    }

    /// Like [`wait`](Self::wait), giving up after `timeout`.
    ///
    /// Returns `true` if the tracked worker finished within the timeout.
    /// Retries a failed spawn but never drains on the calling thread, so it
    /// returns `false` while items are queued and no thread can be started.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        if self.inner.ensure_worker().is_err() {
            return false;
        }
        self.inner.lifecycle.wait_for(timeout)
    }

    /// Await the currently tracked worker from async code.
    ///
    /// The blocking wait runs on tokio's blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Internal` if the blocking wait task was
    /// cancelled or panicked.
    #[cfg(feature = "tokio-runtime")]
    pub async fn wait_async(&self) -> Result<(), SchedulerError> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.wait())
            .await
            .map_err(|e| SchedulerError::Internal(format!("wait task failed: {e}")))
    }

    /// Whether a worker is currently alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.lifecycle.state() != LifecycleState::Idle
    }

    /// Every fault captured so far across all worker generations, or `None`
    /// if no work item has failed.
    #[must_use]
    pub fn faults(&self) -> Option<AggregateFault> {
        self.inner.faults.snapshot()
    }

    /// Number of items waiting to be executed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.queue.len()
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        self.inner.counters.snapshot(
            self.inner.queue.len(),
            self.inner.lifecycle.generations(),
            self.is_running(),
        )
    }

    /// Unique id of this scheduler, used in log records.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.inner.id
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("id", &self.inner.id)
            .field("config", &self.inner.config)
            .field("stats", &self.stats())
            .finish()
    }
}

impl Inner {
    /// Start a worker if the queue has work and nobody owns the lifecycle.
    fn ensure_worker(self: &Arc<Self>) -> Result<(), SchedulerError> {
        // Order the push above before the state read below.
        publish_push();
        if self.queue.is_empty() || !self.lifecycle.is_idle() {
            return Ok(());
        }

        let spawned = self.lifecycle.try_spawn(|generation| {
            let inner = Arc::clone(self);
            let mut builder =
                thread::Builder::new().name(self.config.worker_thread_name(generation));
            if let Some(size) = self.config.stack_size {
                builder = builder.stack_size(size);
            }
            builder
                .spawn(move || inner.run_worker(generation))
                .map(|_detached| ())
        });

        match spawned {
            Ok(_) => Ok(()),
            Err(err) => {
                warn!(
                    scheduler = %self.id,
                    error = %err,
                    pending = self.queue.len(),
                    "Failed to spawn worker thread"
                );
                Err(SchedulerError::WorkerSpawn(err))
            }
        }
    }

    fn wait(self: &Arc<Self>) {
        if self.ensure_worker().is_err() {
            self.drain_on_caller();
        }
        self.lifecycle.wait();
    }

    /// Claim the lifecycle without a thread and run the worker loop inline.
    fn drain_on_caller(&self) {
        if let Ok(Some(generation)) = self.lifecycle.try_spawn(|_| Ok::<(), Infallible>(())) {
            warn!(
                scheduler = %self.id,
                generation = generation,
                pending = self.queue.len(),
                "Draining queue on the waiting thread"
            );
            self.run_worker(generation);
        }
    }

    /// Worker body: drain until empty, then hand the lifecycle back.
    fn run_worker(&self, generation: u64) {
        debug!(scheduler = %self.id, generation = generation, "Worker started");

        loop {
            while let Some(task) = self.queue.try_pop() {
                self.execute(task, generation);
            }
            if !self.lifecycle.release(generation, || !self.queue.is_empty()) {
                break;
            }
            debug!(
                scheduler = %self.id,
                generation = generation,
                "Worker resumed for late submission"
            );
        }

        self.lifecycle.finish(generation);
        debug!(scheduler = %self.id, generation = generation, "Worker exiting");
    }

    fn execute(&self, task: QueuedTask, generation: u64) {
        let QueuedTask { id, job } = task;

        let kind = match panic::catch_unwind(AssertUnwindSafe(job)) {
            Ok(Ok(())) => {
                self.counters.completed.fetch_add(1, Ordering::Relaxed);
                return;
            }
            Ok(Err(err)) => FaultKind::Error(err),
            Err(payload) => FaultKind::from_panic(payload.as_ref()),
        };

        debug!(
            scheduler = %self.id,
            generation = generation,
            task_id = id,
            panicked = kind.is_panic(),
            "Work item fault recorded"
        );
        self.faults.record(Fault {
            task_id: id,
            generation,
            kind,
        });
        self.counters.failed.fetch_add(1, Ordering::Relaxed);
    }
}
