//! Tracing subscriber setup for the binary.

use crate::core::config::LogConfig;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
