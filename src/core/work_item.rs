//! Work item abstraction.

use std::fmt;

/// Identifier assigned to every accepted submission, in submission order.
pub type TaskId = u64;

/// Boxed callable executed by the worker.
pub type Job = Box<dyn FnOnce() -> anyhow::Result<()> + Send + 'static>;

/// An opaque, zero-argument unit of work.
///
/// A `WorkItem` is either a callable or *empty*. The scheduler never looks
/// inside the callable, it only invokes it once. Submitting an empty item is
/// rejected with [`SchedulerError::EmptyWorkItem`](crate::core::SchedulerError).
///
/// ```
/// use sequential_scheduler::core::WorkItem;
///
/// let item = WorkItem::new(|| println!("hello"));
/// assert!(!item.is_empty());
///
/// let checked = WorkItem::fallible(|| {
///     anyhow::ensure!(1 + 1 == 2, "arithmetic is broken");
///     Ok(())
/// });
/// assert!(!checked.is_empty());
///
/// assert!(WorkItem::empty().is_empty());
/// ```
#[derive(Default)]
pub struct WorkItem {
    job: Option<Job>,
}

impl WorkItem {
    /// Wrap an infallible closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::fallible(move || {
            f();
            Ok(())
        })
    }

    /// Wrap a closure whose error is recorded as a fault.
    pub fn fallible<F>(f: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        Self {
            job: Some(Box::new(f)),
        }
    }

    /// The unset work item.
    #[must_use]
    pub const fn empty() -> Self {
        Self { job: None }
    }

    /// Whether this item carries no callable.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.job.is_none()
    }

    pub(crate) fn into_job(self) -> Option<Job> {
        self.job
    }
}

impl From<Job> for WorkItem {
    fn from(job: Job) -> Self {
        Self { job: Some(job) }
    }
}

impl From<Option<Job>> for WorkItem {
    fn from(job: Option<Job>) -> Self {
        Self { job }
    }
}

impl fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkItem")
            .field("empty", &self.is_empty())
            .finish()
    }
}

/// A work item accepted by the scheduler, owned by the queue until popped.
pub(crate) struct QueuedTask {
    pub id: TaskId,
    pub job: Job,
}

impl fmt::Debug for QueuedTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedTask").field("id", &self.id).finish_non_exhaustive()
    }
}
