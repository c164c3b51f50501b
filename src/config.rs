//! Application configuration.
//!
//! Configuration is loaded from:
//! 1. TOML file (`loadrig.toml`, or the path given with `--config`)
//! 2. Environment variables (with `LOADRIG_` prefix)
//!
//! Environment variables override TOML configuration; missing fields take
//! their defaults.
//!
//! # Example TOML Configuration
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8080"
//!
//! [storage]
//! scripts_dir = "./scripts"
//! results_dir = "./scripts/results"
//! retention_days = 30
//!
//! [engine]
//! request_timeout_secs = 30
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default configuration file, read from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "loadrig.toml";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{path}': {error}")]
    Io { path: String, error: String },

    /// Failed to parse TOML.
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// A value is out of range.
    #[error("Invalid config: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub engine: EngineConfig,
}

/// HTTP API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Where scripts and results live on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub scripts_dir: PathBuf,
    pub results_dir: PathBuf,
    /// Results older than this many days are pruned when the server starts.
    pub retention_days: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            scripts_dir: PathBuf::from("./scripts"),
            results_dir: PathBuf::from("./scripts/results"),
            retention_days: None,
        }
    }
}

/// Request executor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub request_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment.
    ///
    /// With `path`, the file must exist. Without it, `loadrig.toml` in the
    /// working directory is used if present, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::read(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::read(default_path)?
                } else {
                    Self::default()
                }
            },
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_toml(&contents)
    }

    /// Apply `LOADRIG_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup. Unparsable numbers are
    /// ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = lookup("LOADRIG_BIND") {
            self.server.bind = bind;
        }

        if let Some(dir) = lookup("LOADRIG_SCRIPTS_DIR") {
            self.storage.scripts_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("LOADRIG_RESULTS_DIR") {
            self.storage.results_dir = PathBuf::from(dir);
        }
        if let Some(days) = lookup("LOADRIG_RETENTION_DAYS") {
            if let Ok(v) = days.parse() {
                self.storage.retention_days = Some(v);
            }
        }

        if let Some(timeout) = lookup("LOADRIG_REQUEST_TIMEOUT_SECS") {
            if let Ok(v) = timeout.parse() {
                self.engine.request_timeout_secs = v;
            }
        }
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "engine.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.server.bind.trim().is_empty() {
            return Err(ConfigError::Validation(
                "server.bind must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-request timeout for the HTTP transport.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.engine.request_timeout_secs)
    }

    /// Retention window for stored results, if pruning is enabled.
    pub fn retention(&self) -> Option<Duration> {
        self.storage
            .retention_days
            .map(|days| Duration::from_secs(days.saturating_mul(24 * 60 * 60)))
    }
}
