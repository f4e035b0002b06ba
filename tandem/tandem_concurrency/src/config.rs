//! Run configuration.
//!
//! Defaults reproduce the classic run: count 0 through 20 inclusive, with the
//! down-counter parked on a condition variable and no wait timeout.

use std::fs;
use std::io;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sync::WaitStrategy;

/// Errors that can occur in configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read configuration from {path}")]
    Read {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// The configuration could not be parsed
    #[error("failed to parse configuration")]
    Parse(#[from] toml::de::Error),

    /// The counting range is empty
    #[error("invalid counting range: start {start} is greater than end {end}")]
    InvalidRange {
        /// First value counted up from
        start: u32,
        /// Last value counted up to
        end: u32,
    },
}

/// Configuration for one run of the two counting tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    /// Lowest value counted, inclusive
    pub start: u32,

    /// Highest value counted, inclusive
    pub end: u32,

    /// How the down-counter waits for the up-counter
    pub wait: WaitStrategy,

    /// Upper bound on the down-counter's wait, in milliseconds
    pub wait_timeout_ms: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            start: 0,
            end: 20,
            wait: WaitStrategy::default(),
            wait_timeout_ms: None,
        }
    }
}

impl RunnerConfig {
    /// Parse and validate a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&text)
    }

    /// Check that the configuration describes a runnable count
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start > self.end {
            return Err(ConfigError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Values counted, in ascending order
    pub fn range(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }

    /// The down-counter's wait bound, if any
    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout_ms.map(Duration::from_millis)
    }

    /// Override the wait strategy
    pub fn with_wait(mut self, wait: WaitStrategy) -> Self {
        self.wait = wait;
        self
    }
}
