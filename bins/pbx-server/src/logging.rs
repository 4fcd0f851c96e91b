//! Logging setup.
//!
//! Simpler than the full stack's `tetra_core::debug` module: there is no
//! per-timeslot trace volume to filter by module, and no non-blocking file
//! appender to set up, so a single `EnvFilter`-driven stdout subscriber is
//! enough. `init` may be called more than once (e.g. from both `main` and
//! integration tests); only the first call takes effect.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT_LOG: Once = Once::new();

/// Installs a stdout subscriber filtered by `RUST_LOG`, defaulting to
/// `info` when the variable is unset.
pub fn init() {
    INIT_LOG.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}
