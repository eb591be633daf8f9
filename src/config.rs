use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use thiserror::Error;

pub const CONFIG_ENV_VAR: &str = "COLLECTOR_CONFIG";
pub const DEFAULT_QUEUE_SIZE: usize = 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("queue_size must be positive, got {0}")]
    InvalidQueueSize(usize),
    #[error("invalid collector config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Which collector a stage should run with.
///
/// JSON form: `{"type": "observe", "queue_size": 64}`, `{"type": "grouped"}` or
/// `{"type": "noop"}`. A missing `queue_size` falls back to [`DEFAULT_QUEUE_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", try_from = "RawCollectorConfig")]
pub enum CollectorConfig {
    Observe { queue_size: NonZeroUsize },
    Grouped,
    Noop,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        CollectorConfig::Observe {
            queue_size: NonZeroUsize::new(DEFAULT_QUEUE_SIZE).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl CollectorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawCollectorConfig = serde_json::from_str(json)?;
        raw.try_into()
    }

    /// Reads [`CONFIG_ENV_VAR`]. Unset means the default config.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(json) => Self::from_json(&json),
            Err(_) => Ok(Self::default()),
        }
    }
}

// Unvalidated shape, so a zero queue size reports `InvalidQueueSize` instead of a parse error.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawCollectorConfig {
    Observe {
        #[serde(default = "default_queue_size")]
        queue_size: usize,
    },
    Grouped,
    Noop,
}

fn default_queue_size() -> usize {
    DEFAULT_QUEUE_SIZE
}

impl TryFrom<RawCollectorConfig> for CollectorConfig {
    type Error = ConfigError;

    fn try_from(raw: RawCollectorConfig) -> Result<Self, ConfigError> {
        Ok(match raw {
            RawCollectorConfig::Observe { queue_size } => CollectorConfig::Observe {
                queue_size: NonZeroUsize::new(queue_size)
                    .ok_or(ConfigError::InvalidQueueSize(queue_size))?,
            },
            RawCollectorConfig::Grouped => CollectorConfig::Grouped,
            RawCollectorConfig::Noop => CollectorConfig::Noop,
        })
    }
}
