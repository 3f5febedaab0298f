//! Tracing subscriber setup.

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Install a global subscriber.
///
/// `RUST_LOG` overrides `level`. Pass `format = "json"` for structured JSON
/// output; any other value gives human-readable text. Returns `false` if a
/// subscriber was already installed, so tests may call this repeatedly.
pub fn init_logging(level: &str, format: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true))
            .try_init()
            .is_ok()
    }
}
