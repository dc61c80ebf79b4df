//! Error types for scheduler operations.

use thiserror::Error;

/// Errors returned synchronously by the scheduler's public operations.
///
/// Failures raised by work items themselves never appear here; they are
/// captured as [`Fault`](crate::core::Fault)s and exposed through
/// [`Scheduler::faults`](crate::core::Scheduler::faults).
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// `submit` was called with an empty work item.
    #[error("work item is empty")]
    EmptyWorkItem,
    /// The operating system refused to start the worker thread.
    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Internal failure (for example a blocking wait task that was aborted).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(SchedulerError::EmptyWorkItem.to_string(), "work item is empty");
        assert_eq!(
            SchedulerError::InvalidConfig("thread_name must not be empty".into()).to_string(),
            "invalid configuration: thread_name must not be empty"
        );

        let io = std::io::Error::other("no threads left");
        let err = SchedulerError::from(io);
        assert_eq!(err.to_string(), "failed to spawn worker thread: no threads left");
    }
}
