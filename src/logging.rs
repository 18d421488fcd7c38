//! Diagnostic tracing for the demos and `demo-check`.
//!
//! Tracing goes to stderr and is controlled by `RUST_LOG`. Demo narration and
//! reports are printed directly and never depend on the filter.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`; falls back to `warn`, or `debug` when `verbose` is set.
/// Calling it twice is harmless: the second registration is ignored.
///
/// # Example
/// ```bash
/// RUST_LOG=sanitizer_demos=debug cargo run --bin demo-check
/// ```
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
