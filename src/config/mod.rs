//! Helper configuration.
//!
//! The helper runs with no arguments and no stdin, so configuration comes
//! from an optional YAML file (`REVEIL_CONFIG` env var, falling back to
//! `/etc/reveil/config.yaml`). A missing file yields the defaults, which
//! reproduce the stock installation: documents under `/Users/Shared/Reveil`,
//! the system pmset, a five-second invocation timeout.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::documents::SharedDir;

/// Environment variable naming an alternate config file.
pub const CONFIG_ENV: &str = "REVEIL_CONFIG";

/// Default config file location.
const DEFAULT_CONFIG_PATH: &str = "/etc/reveil/config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse YAML.
    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Helper configuration (config.yaml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HelperConfig {
    /// Directory holding the schedule document, state document, and log.
    pub shared_dir: PathBuf,
    /// Path of the pmset binary, if not the system one.
    pub pmset_path: Option<PathBuf>,
    /// Ceiling on a single facility invocation, in seconds.
    pub facility_timeout_secs: u64,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            shared_dir: PathBuf::from(SharedDir::DEFAULT_PATH),
            pmset_path: None,
            facility_timeout_secs: 5,
        }
    }
}

impl HelperConfig {
    /// Load configuration from the standard location: `$REVEIL_CONFIG` if
    /// set, else the default path. A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(path)
    }

    /// Load configuration from a specific file; missing file yields the
    /// defaults, an unreadable or invalid file is an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Set the shared directory.
    pub fn with_shared_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shared_dir = dir.into();
        self
    }

    /// The facility invocation timeout as a duration.
    pub fn facility_timeout(&self) -> Duration {
        Duration::from_secs(self.facility_timeout_secs)
    }

    /// The shared directory handle.
    pub fn shared_dir(&self) -> SharedDir {
        SharedDir::new(&self.shared_dir)
    }
}
