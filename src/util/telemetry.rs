//! Telemetry helpers for structured logging and tracing.

use tracing_subscriber::EnvFilter;

/// Initialize tracing from `RUST_LOG`. Users can install their own
/// subscriber; this helper only installs a default fmt subscriber if none is
/// set.
pub fn init_tracing() {
    install(EnvFilter::from_default_env());
}

/// Initialize tracing from `RUST_LOG`, falling back to `default_directives`
/// (for example `"sequential_scheduler=debug"`) when the variable is unset or
/// invalid.
pub fn init_tracing_with_default(default_directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));
    install(filter);
}

fn install(filter: EnvFilter) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
