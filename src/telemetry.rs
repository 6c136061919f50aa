//! Tracing initialization for embedding binaries.

use tracing_subscriber::EnvFilter;

/// Initializes a formatted tracing subscriber.
///
/// Filtering follows `RUST_LOG`, defaulting to `info` for this crate.
/// Call once at process start; a second call is a no-op.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("concierge=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
