//! Configuration models for the scheduler.

pub mod scheduler;

pub use scheduler::{SchedulerConfig, DEFAULT_THREAD_NAME};
