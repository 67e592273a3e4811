//! `tracing` subscriber setup for binaries and tests that embed the engine.

use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber filtered by `RUST_LOG`, falling back to `default_directive`
/// (e.g. `"info"` or `"dataprep_engine=debug"`).
///
/// Returns `false` if a global subscriber was already installed; calling it twice is harmless.
pub fn init(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
