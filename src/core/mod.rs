//! Core scheduling components: queue, fault log, worker lifecycle and the
//! scheduler composing them.

pub mod error;
pub mod fault_log;
pub mod scheduler;
pub mod stats;
pub mod work_item;

mod lifecycle;
mod pending_queue;

pub use error::{AppResult, SchedulerError};
pub use fault_log::{AggregateFault, Fault, FaultKind};
pub use scheduler::Scheduler;
pub use stats::SchedulerStats;
pub use work_item::{Job, TaskId, WorkItem};
