//! Runtime configuration.
//!
//! Configuration is JSON. Every field has a default, so an empty object is a
//! valid document. Durations are written as whole seconds.
//!
//! ```json
//! {
//!   "discovery": { "source_locations": ["templates"] },
//!   "scheduler": { "max_concurrent_agents": 4, "idle_timeout": 600 }
//! }
//! ```

use crate::discovery::domain::DEFAULT_MANIFEST_SUFFIX;
use crate::template::domain::CatalogLimits;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration {path}: {source}")]
    Read {
        /// Configuration path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration is not valid JSON for [`RuntimeConfig`].
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Template discovery settings.
    pub discovery: DiscoveryConfig,
    /// Agent scheduler settings.
    pub scheduler: SchedulerConfig,
}

impl RuntimeConfig {
    /// Parses and validates configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the text is malformed or a value is out
    /// of range.
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed, or a
    /// value is out of range.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let read_error = |source| ConfigError::Read {
            path: path.to_owned(),
            source,
        };
        let parent = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let file_name = path.file_name().ok_or_else(|| {
            read_error(std::io::Error::other(
                "configuration path must include a file name",
            ))
        })?;
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
        let contents = dir.read_to_string(file_name).map_err(read_error)?;
        Self::from_json(&contents)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.discovery.manifest_suffix.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "discovery.manifest_suffix must not be empty".to_owned(),
            ));
        }
        self.scheduler.validate()
    }
}

/// Template discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Directories scanned recursively for manifests.
    pub source_locations: Vec<Utf8PathBuf>,
    /// File-name suffix identifying manifests.
    pub manifest_suffix: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            source_locations: Vec::new(),
            manifest_suffix: DEFAULT_MANIFEST_SUFFIX.to_owned(),
        }
    }
}

/// Agent scheduler settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Ceiling on tracked agents, in any status.
    pub max_concurrent_agents: usize,
    /// Inactivity after which an idle agent is evicted.
    #[serde(with = "seconds")]
    pub idle_timeout: Duration,
    /// How long terminal tasks are kept.
    #[serde(with = "seconds")]
    pub task_retention: Duration,
    /// Period of the idle-cleanup and task-pruning loop.
    #[serde(with = "seconds")]
    pub cleanup_interval: Duration,
    /// Period of the statistics logging loop.
    #[serde(with = "seconds")]
    pub monitor_interval: Duration,
}

impl SchedulerConfig {
    /// Default concurrency ceiling.
    pub const DEFAULT_MAX_CONCURRENT_AGENTS: usize = 10;
    /// Default idle timeout (one hour).
    pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);
    /// Default task retention (24 hours).
    pub const DEFAULT_TASK_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);
    /// Default cleanup period (30 minutes).
    pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(30 * 60);
    /// Default monitoring period (5 minutes).
    pub const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_secs(5 * 60);

    /// Returns a copy with a different concurrency ceiling.
    #[must_use]
    pub const fn with_max_concurrent_agents(mut self, max: usize) -> Self {
        self.max_concurrent_agents = max;
        self
    }

    /// Returns the limits advertised in the catalog schema.
    #[must_use]
    pub const fn limits(&self) -> CatalogLimits {
        CatalogLimits {
            max_concurrent_agents: self.max_concurrent_agents,
            idle_timeout_secs: self.idle_timeout.as_secs(),
            task_retention_secs: self.task_retention.as_secs(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_agents == 0 {
            return Err(ConfigError::Invalid(
                "scheduler.max_concurrent_agents must be at least 1".to_owned(),
            ));
        }
        if self.cleanup_interval.is_zero() || self.monitor_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "scheduler loop intervals must be at least one second".to_owned(),
            ));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_agents: Self::DEFAULT_MAX_CONCURRENT_AGENTS,
            idle_timeout: Self::DEFAULT_IDLE_TIMEOUT,
            task_retention: Self::DEFAULT_TASK_RETENTION,
            cleanup_interval: Self::DEFAULT_CLEANUP_INTERVAL,
            monitor_interval: Self::DEFAULT_MONITOR_INTERVAL,
        }
    }
}

mod seconds {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(value.as_secs())
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
