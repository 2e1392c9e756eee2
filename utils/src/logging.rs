//! Structured logging initialization via `tracing`.

use tracing_subscriber::EnvFilter;

/// Build a filter from `RUST_LOG`, falling back to `default_level`
/// (e.g. `"info"` or `"adsettle_contract=debug,info"`).
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize the tracing subscriber with sensible defaults.
///
/// Respects the `RUST_LOG` environment variable for filtering. Safe to call
/// more than once; later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter("info"))
        .try_init();
}
