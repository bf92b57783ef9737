//! Telemetry helpers for structured logging.

/// Install a default env-filtered subscriber writing to stderr.
///
/// Stdout is reserved for output records. Does nothing if a global
/// subscriber is already set, so embedders can install their own.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
