//! Scheduler configuration.

use serde::{Deserialize, Serialize};

/// Default worker thread name prefix.
pub const DEFAULT_THREAD_NAME: &str = "seq-worker";

/// Settings applied to every worker thread the scheduler starts.
///
/// ```
/// use sequential_scheduler::config::SchedulerConfig;
///
/// let cfg = SchedulerConfig::new()
///     .with_thread_name("ingest")
///     .with_stack_size(512 * 1024);
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Worker thread name prefix; the generation number is appended.
    pub thread_name: String,
    /// Worker stack size in bytes. `None` uses the platform default.
    pub stack_size: Option<usize>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            stack_size: None,
        }
    }
}

impl SchedulerConfig {
    /// Configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker thread name prefix.
    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Set the worker stack size in bytes.
    #[must_use]
    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.thread_name.trim().is_empty() {
            return Err("thread_name must not be empty".into());
        }
        if self.thread_name.contains('\0') {
            return Err("thread_name must not contain NUL bytes".into());
        }
        if self.stack_size == Some(0) {
            return Err("stack_size must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a description of the parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub(crate) fn worker_thread_name(&self, generation: u64) -> String {
        format!("{}-{generation}", self.thread_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = SchedulerConfig::new();
        assert_eq!(cfg.thread_name, "seq-worker");
        assert_eq!(cfg.stack_size, None);
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.worker_thread_name(3), "seq-worker-3");
    }

    #[test]
    fn test_builders() {
        let cfg = SchedulerConfig::new()
            .with_thread_name("audit")
            .with_stack_size(64 * 1024);
        assert_eq!(cfg.thread_name, "audit");
        assert_eq!(cfg.stack_size, Some(64 * 1024));
    }

    #[test]
    fn test_validation_failures() {
        assert_eq!(
            SchedulerConfig::new().with_thread_name("  ").validate(),
            Err("thread_name must not be empty".to_string())
        );
        assert!(SchedulerConfig::new().with_thread_name("a\0b").validate().is_err());
        assert_eq!(
            SchedulerConfig::new().with_stack_size(0).validate(),
            Err("stack_size must be greater than 0".to_string())
        );
    }

    #[test]
    fn test_from_json_str() {
        let cfg = SchedulerConfig::from_json_str(r#"{"thread_name":"mail","stack_size":131072}"#)
            .unwrap();
        assert_eq!(cfg.thread_name, "mail");
        assert_eq!(cfg.stack_size, Some(131_072));

        // Missing fields fall back to defaults.
        let cfg = SchedulerConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, SchedulerConfig::default());

        let err = SchedulerConfig::from_json_str("{").unwrap_err();
        assert!(err.starts_with("parse error:"));

        let err = SchedulerConfig::from_json_str(r#"{"thread_name":""}"#).unwrap_err();
        assert_eq!(err, "thread_name must not be empty");
    }
}
