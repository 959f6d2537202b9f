//! Tracing setup

use tracing_subscriber::EnvFilter;

/// Install the global subscriber, logging to stderr
///
/// `RUST_LOG` wins over `verbose`. Calling this twice is harmless.
pub fn init(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
