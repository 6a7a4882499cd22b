//! `tracing` subscriber setup for hosts of the motion core.

use crate::config::LogLevel;
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber.
///
/// `RUST_LOG` directives take precedence over `level`. Returns `false` if a
/// global subscriber was already installed (the existing one stays active).
pub fn init(level: LogLevel, json: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .is_ok()
    }
}
