//! Structured logging init (§6a.5): a `tracing-subscriber` `fmt` layer
//! filtered by `RUST_LOG`, defaulting to `info`.

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Safe to call more than once per process;
/// later calls are no-ops (each binary calls this exactly once from `main`,
/// but tests may call it from several integration test binaries).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
