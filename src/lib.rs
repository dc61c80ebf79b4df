//! # Sequential Scheduler
//!
//! A shared FIFO work queue executed by a single, lazily spawned worker thread.
//!
//! Any number of producer threads submit zero-argument work items. Items run
//! strictly in the order they were enqueued, one at a time, on a background
//! worker that is started on demand and exits as soon as the queue drains.
//! The next submission after that starts a fresh worker.
//!
//! ## Key Features
//!
//! - **Strict FIFO**: one item at a time, in enqueue order
//! - **At most one worker**: an atomic state transition picks a single
//!   producer to start the worker; everyone else just enqueues
//! - **Lazy lifecycle**: no idle thread is kept around between bursts
//! - **Fault isolation**: errors and panics raised by an item are recorded
//!   and never stop the items behind it
//! - **Blocking and async waits**: `wait`, `wait_timeout`, and `wait_async`
//!   (with the `tokio-runtime` feature)
//!
//! ## Example
//!
//! ```rust
//! use sequential_scheduler::{Scheduler, SchedulerError, WorkItem};
//!
//! let scheduler = Scheduler::new();
//!
//! scheduler.submit_fn(|| println!("first")).unwrap();
//! let failing = scheduler
//!     .submit_fallible(|| Err(anyhow::anyhow!("second failed")))
//!     .unwrap();
//! scheduler.submit_fn(|| println!("third")).unwrap();
//!
//! // Empty items are rejected synchronously.
//! assert!(matches!(
//!     scheduler.submit(WorkItem::empty()),
//!     Err(SchedulerError::EmptyWorkItem)
//! ));
//!
//! scheduler.wait();
//! assert!(!scheduler.is_running());
//!
//! let faults = scheduler.faults().expect("one item failed");
//! assert_eq!(faults.len(), 1);
//! assert!(faults.for_task(failing).is_some());
//! ```

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Configuration models for the scheduler.
pub mod config;
/// Core scheduling components.
pub mod core;
/// Shared utilities.
pub mod util;

pub use crate::config::SchedulerConfig;
pub use crate::core::{
    AggregateFault, AppResult, Fault, FaultKind, Scheduler, SchedulerError, SchedulerStats,
    TaskId, WorkItem,
};
