//! Logging initialisation.
//!
//! Installs a global `tracing` subscriber filtered by `RuntimeConfig::log_level`,
//! writing either JSON lines or human-readable text to stderr.

use crate::config::RuntimeConfig;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Invalid log filter {directive:?}: {message}")]
    Filter { directive: String, message: String },

    /// A global subscriber is already installed.
    #[error("Logging already initialised: {0}")]
    AlreadyInitialised(String),
}

/// Install the global subscriber. A second call returns an error and leaves
/// the first subscriber in place.
pub fn init_logging(config: &RuntimeConfig) -> Result<(), TelemetryError> {
    let filter =
        EnvFilter::try_new(&config.log_level).map_err(|e| TelemetryError::Filter {
            directive: config.log_level.clone(),
            message: e.to_string(),
        })?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    installed.map_err(|e| TelemetryError::AlreadyInitialised(e.to_string()))?;

    tracing::info!(
        log_level = %config.log_level,
        json_logs = config.json_logs,
        "logging initialised"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_directive_rejected() {
        let config = RuntimeConfig {
            log_level: "axon_broker=loud".into(),
            ..RuntimeConfig::default()
        };
        assert!(matches!(
            init_logging(&config),
            Err(TelemetryError::Filter { .. })
        ));
    }

    #[test]
    fn test_second_init_is_an_error() {
        let config = RuntimeConfig::default();
        let _ = init_logging(&config);
        assert!(matches!(
            init_logging(&config),
            Err(TelemetryError::AlreadyInitialised(_))
        ));
    }
}
