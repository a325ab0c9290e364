/*!
 * Configuration types for Relic
 */

use crate::error::{RelicError, Result};
use relic_core_inventory::{ChecksumAlgorithm, DEFAULT_ALGORITHMS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::Level;

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to a tracing level
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Main configuration for Relic operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelicConfig {
    /// Digest algorithms computed for every harvested file
    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<ChecksumAlgorithm>,

    /// Group id used when a harvested directory has no subdirectories
    #[serde(default = "default_group_id")]
    pub default_group_id: String,

    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path (None = stdout)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (shorthand for log_level = debug)
    #[serde(default)]
    pub verbose: bool,
}

fn default_algorithms() -> Vec<ChecksumAlgorithm> {
    DEFAULT_ALGORITHMS.to_vec()
}

fn default_group_id() -> String {
    relic_core_inventory::CONTENT_GROUP_ID.to_string()
}

impl Default for RelicConfig {
    fn default() -> Self {
        Self {
            algorithms: default_algorithms(),
            default_group_id: default_group_id(),
            log_level: LogLevel::default(),
            log_file: None,
            verbose: false,
        }
    }
}

impl RelicConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: RelicConfig = toml::from_str(&contents)
            .map_err(|e| RelicError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &PathBuf) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| RelicError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.algorithms.is_empty() {
            return Err(RelicError::Config(
                "at least one checksum algorithm must be enabled".to_string(),
            ));
        }
        if self.default_group_id.is_empty() {
            return Err(RelicError::Config(
                "default_group_id cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
