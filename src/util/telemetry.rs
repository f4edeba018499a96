//! Telemetry helpers for structured logging.
//!
//! Executors log through `tracing`: `info` for lifecycle transitions, `debug`
//! for each submitted and finished operation (inside an `operation` span
//! carrying the executor name, submission id and operation name), and `warn`
//! for rejections, failed operations, and panics.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "prometheus_sharer=info";

/// Install a default `fmt` subscriber filtered by `RUST_LOG`, unless the
/// application already installed its own.
pub fn init_tracing() {
    init_tracing_with(DEFAULT_FILTER);
}

/// Like [`init_tracing`], falling back to `default_filter` when `RUST_LOG`
/// is unset.
pub fn init_tracing_with(default_filter: &str) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_repeatable() {
        init_tracing();
        init_tracing_with("debug");
        assert!(tracing::dispatcher::has_been_set());
    }
}
