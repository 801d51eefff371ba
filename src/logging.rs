//! Global subscriber installation. Only the facade crate does this; every library crate
//! below it only ever emits `tracing` events and never installs a collector itself.

use tracing_subscriber::EnvFilter;

/// Installs a `RUST_LOG`-driven subscriber, defaulting to `info` when the variable is
/// unset, the way the reference load-balancing proxy bootstraps its own logging.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).compact().init();
}
