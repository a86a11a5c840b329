//! # Runtime Configuration
//!
//! | Variable | Default | Field |
//! |----------|---------|-------|
//! | `AXON_DATA_DIR` | `./data` | `data_dir` |
//! | `AXON_REPLAY_WINDOW_SECS` | `300` | `replay_window_secs` |
//! | `AXON_HEARTBEAT_STALE_SECS` | `300` | `heartbeat_stale_secs` |
//! | `AXON_CATALOG_PATH` | built-in catalog | `catalog_path` |
//! | `AXON_LOG_LEVEL` or `RUST_LOG` | `info` | `log_level` |
//! | `AXON_JSON_LOGS` | `false` | `json_logs` |

use axon_broker::BrokerConfig;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_WINDOW_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("Replay window must be greater than zero")]
    ZeroReplayWindow,

    #[error("Heartbeat staleness threshold must be greater than zero")]
    ZeroHeartbeatThreshold,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Holds `registry.json`, `audit.jsonl`, and `LOCK`.
    pub data_dir: PathBuf,
    pub replay_window_secs: u64,
    pub heartbeat_stale_secs: u64,
    /// JSON catalog file. `None` uses the built-in catalog.
    pub catalog_path: Option<PathBuf>,
    /// `EnvFilter` directive, e.g. `info` or `axon_broker=debug`.
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            replay_window_secs: DEFAULT_WINDOW_SECS,
            heartbeat_stale_secs: DEFAULT_WINDOW_SECS,
            catalog_path: None,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl RuntimeConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// unset variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let seconds = |var: &'static str, default: u64| -> Result<u64, ConfigError> {
            match lookup(var) {
                Some(value) => value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidNumber { var, value }),
                None => Ok(default),
            }
        };

        let config = Self {
            data_dir: lookup("AXON_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            replay_window_secs: seconds("AXON_REPLAY_WINDOW_SECS", defaults.replay_window_secs)?,
            heartbeat_stale_secs: seconds(
                "AXON_HEARTBEAT_STALE_SECS",
                defaults.heartbeat_stale_secs,
            )?,
            catalog_path: lookup("AXON_CATALOG_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            log_level: lookup("AXON_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            json_logs: lookup("AXON_JSON_LOGS")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(defaults.json_logs),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.replay_window_secs == 0 {
            return Err(ConfigError::ZeroReplayWindow);
        }
        if self.heartbeat_stale_secs == 0 {
            return Err(ConfigError::ZeroHeartbeatThreshold);
        }
        Ok(())
    }

    /// A default configuration rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn broker(&self) -> BrokerConfig {
        BrokerConfig {
            replay_window: Duration::from_secs(self.replay_window_secs),
            heartbeat_stale_after: Duration::from_secs(self.heartbeat_stale_secs),
        }
    }
}
