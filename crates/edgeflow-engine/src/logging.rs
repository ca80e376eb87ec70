//! Logging setup for hosts that do not install their own subscriber.
//!
//! The engine itself only emits `tracing` events. Binaries, tests, and C
//! callers (via `edgeflow_init_logging`) can use these helpers to get output.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing with engine defaults.
///
/// Sets up tracing-subscriber with:
/// - Environment filter (RUST_LOG), defaulting to `info`
/// - Compact format suitable for terminal output
///
/// Returns false if a global subscriber was already installed.
pub fn init() -> bool {
    init_with_filter("info")
}

/// Initialize tracing with a custom default filter.
pub fn init_with_filter(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init()
        .is_ok()
}
