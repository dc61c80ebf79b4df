//! Append-only record of work item failures.
//!
//! Every failed invocation (a returned error or a panic) becomes one
//! [`Fault`]. The log lives as long as the scheduler and is never cleared;
//! callers read it through [`AggregateFault`] snapshots.

use std::any::Any;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use super::work_item::TaskId;

/// How a work item failed.
#[derive(Debug, Error)]
pub enum FaultKind {
    /// The item returned an error.
    #[error("{0:#}")]
    Error(anyhow::Error),
    /// The item panicked; holds the panic message when it was a string.
    ///
    /// The panic is caught, but the process panic hook still runs first, so
    /// with the default hook a `thread '<worker>' panicked at ...` line is
    /// printed to stderr. Install a hook with [`std::panic::set_hook`] to
    /// silence or redirect it.
    #[error("panicked: {0}")]
    Panic(String),
}

impl FaultKind {
    /// Build a fault from a `catch_unwind` payload.
    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Panic(message)
    }

    /// Whether the item panicked rather than returning an error.
    #[must_use]
    pub const fn is_panic(&self) -> bool {
        matches!(self, Self::Panic(_))
    }
}

/// A single captured work item failure.
#[derive(Debug, Error)]
#[error("task {task_id} failed: {kind}")]
pub struct Fault {
    /// Id returned by `submit` for the failed item.
    pub task_id: TaskId,
    /// Worker generation that executed the item.
    pub generation: u64,
    /// The captured failure.
    #[source]
    pub kind: FaultKind,
}

/// Snapshot of every fault recorded so far, oldest first.
///
/// Only produced when at least one fault exists.
#[derive(Debug, Clone, Error)]
#[error("{} work item(s) failed", .faults.len())]
pub struct AggregateFault {
    faults: Vec<Arc<Fault>>,
}

impl AggregateFault {
    /// Number of captured faults.
    #[must_use]
    pub fn len(&self) -> usize {
        self.faults.len()
    }

    /// Always false: an empty log yields no snapshot at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faults.is_empty()
    }

    /// Iterate faults in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = &Fault> {
        self.faults.iter().map(Arc::as_ref)
    }

    /// Fault recorded for `task_id`, if that task failed.
    #[must_use]
    pub fn for_task(&self, task_id: TaskId) -> Option<&Fault> {
        self.iter().find(|f| f.task_id == task_id)
    }

    /// Borrow the underlying shared faults.
    #[must_use]
    pub fn faults(&self) -> &[Arc<Fault>] {
        &self.faults
    }
}

/// Lock-guarded fault list; appends and snapshots never interleave.
#[derive(Debug, Default)]
pub(crate) struct FaultLog {
    entries: RwLock<Vec<Arc<Fault>>>,
}

impl FaultLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, fault: Fault) {
        self.entries.write().push(Arc::new(fault));
    }

    pub fn snapshot(&self) -> Option<AggregateFault> {
        let entries = self.entries.read();
        if entries.is_empty() {
            return None;
        }
        Some(AggregateFault {
            faults: entries.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn error_fault(task_id: TaskId, msg: &str) -> Fault {
        Fault {
            task_id,
            generation: 1,
            kind: FaultKind::Error(anyhow::anyhow!(msg.to_string())),
        }
    }

    #[test]
    fn test_empty_log_has_no_snapshot() {
        let log = FaultLog::new();
        assert!(log.snapshot().is_none());
    }

    #[test]
    fn test_snapshot_preserves_order() {
        let log = FaultLog::new();
        log.record(error_fault(3, "first"));
        log.record(error_fault(7, "second"));

        let snapshot = log.snapshot().unwrap();
        assert_eq!(snapshot.len(), 2);
        let ids: Vec<TaskId> = snapshot.iter().map(|f| f.task_id).collect();
        assert_eq!(ids, vec![3, 7]);
        assert_eq!(snapshot.to_string(), "2 work item(s) failed");
        assert_eq!(snapshot.for_task(7).unwrap().to_string(), "task 7 failed: second");
        assert!(snapshot.for_task(4).is_none());
    }

    #[test]
    fn test_snapshot_is_immutable_view() {
        let log = FaultLog::new();
        log.record(error_fault(1, "one"));
        let before = log.snapshot().unwrap();
        log.record(error_fault(2, "two"));

        assert_eq!(before.len(), 1);
        assert_eq!(log.snapshot().unwrap().len(), 2);
    }

    #[test]
    fn test_panic_payloads() {
        let fault = FaultKind::from_panic(&"static message");
        assert_eq!(fault.to_string(), "panicked: static message");
        assert!(fault.is_panic());

        let owned: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(FaultKind::from_panic(owned.as_ref()).to_string(), "panicked: owned message");

        let other: Box<dyn Any + Send> = Box::new(42_u32);
        assert_eq!(
            FaultKind::from_panic(other.as_ref()).to_string(),
            "panicked: non-string panic payload"
        );
    }

    #[test]
    fn test_error_context_chain_is_rendered() {
        let err = anyhow::anyhow!("connection reset").context("uploading report");
        let kind = FaultKind::Error(err);
        assert!(!kind.is_panic());
        assert_eq!(kind.to_string(), "uploading report: connection reset");
    }

    #[test]
    fn test_concurrent_read_while_writing() {
        let log = std::sync::Arc::new(FaultLog::new());
        let writer = {
            let log = std::sync::Arc::clone(&log);
            thread::spawn(move || {
                for id in 0..1_000 {
                    log.record(error_fault(id, "boom"));
                }
            })
        };

        let mut last = 0;
        while last < 1_000 {
            let seen = log.snapshot().map_or(0, |s| s.len());
            assert!(seen >= last, "fault log shrank from {last} to {seen}");
            last = seen;
        }
        writer.join().unwrap();
    }
}
