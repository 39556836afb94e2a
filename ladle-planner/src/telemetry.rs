//! Logging bootstrap.

use ladle_core::{ConfigError, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter. Logs go to
/// stderr. Fails if the filter does not parse or a subscriber is already
/// installed.
pub fn init_tracing(settings: &TelemetrySettings) -> Result<(), ConfigError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(&settings.log_filter)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| ConfigError::InvalidValue {
            field: "telemetry",
            reason: format!("failed to install subscriber: {}", e),
        })
}

fn build_filter(directives: &str) -> Result<EnvFilter, ConfigError> {
    EnvFilter::try_new(directives).map_err(|e| ConfigError::InvalidValue {
        field: "telemetry.log_filter",
        reason: e.to_string(),
    })
}
