//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Default level when `RUST_LOG` is unset. Debug-level storage and
/// fetch chatter stays opt-in.
const DEFAULT_DIRECTIVES: &str = "info,doorstep_storage=warn";

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times; only the first call installs the
/// subscriber.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    // JSON logs + timestamps, configurable via RUST_LOG.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
