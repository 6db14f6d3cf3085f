//! Configuration shared by the node facade and the command-line driver.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CoreError;

/// Full configuration for a PCN network instance.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PcnConfig {
    /// Settlement engine settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Workload driver settings.
    #[serde(default)]
    pub driver: DriverConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Optional cap on the number of hops in a single transfer. Unset means
    /// any path of distinct users is accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_path_len: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Print the running success ratio every this many transfers.
    #[serde(default = "default_report_every")]
    pub report_every: usize,
    /// Number of transfers issued concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}
fn default_report_every() -> usize {
    10
}
fn default_concurrency() -> usize {
    1
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            report_every: default_report_every(),
            concurrency: default_concurrency(),
        }
    }
}

impl PcnConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&contents)
    }

    /// Parse config from a TOML document. Unknown tables are ignored.
    pub fn from_toml(contents: &str) -> Result<Self, CoreError> {
        let config: PcnConfig =
            toml::from_str(contents).map_err(|e| CoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, CoreError> {
        toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.engine.max_path_len == Some(0) {
            return Err(CoreError::Config("engine.max_path_len must be at least 1".into()));
        }
        if self.driver.report_every == 0 {
            return Err(CoreError::Config("driver.report_every must be at least 1".into()));
        }
        if self.driver.concurrency == 0 {
            return Err(CoreError::Config("driver.concurrency must be at least 1".into()));
        }
        match self.logging.format.as_str() {
            "text" | "json" => Ok(()),
            other => Err(CoreError::Config(format!("unknown log format: {other}"))),
        }
    }
}
