//! Opt-in `tracing` subscriber for applications embedding the client.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directives are read from this variable.
pub const ENV_LOG: &str = "LOUIE_LOG";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Install a stderr fmt subscriber filtered by `LOUIE_LOG` (default `info`).
///
/// Returns `false` when a global subscriber was already installed, which
/// leaves the existing one in place.
pub fn init_logging() -> bool {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}
