//! # Observability
//!
//! Structured logging through `tracing`. The subscriber writes to stderr so
//! stdout stays free for the progress event the CLI prints.

pub mod logging;

use crate::config::ObservabilityConfig;
use crate::errors::{Error, Result};
use tracing_subscriber::EnvFilter;
use validator::Validate;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set. An already-installed
/// subscriber (e.g. in tests) is left in place.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    config
        .validate()
        .map_err(|e| Error::config(format!("invalid observability config: {}", e)))?;

    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.is_empty() => EnvFilter::new(directives),
        _ => EnvFilter::try_new(&config.log_level).map_err(|e| {
            Error::config(format!("invalid log level '{}': {}", config.log_level, e))
        })?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);

    // A subscriber may already be installed (tests); keep it.
    let _ = if config.json_logging { builder.json().try_init() } else { builder.try_init() };
    Ok(())
}
