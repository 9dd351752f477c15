use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found: {path}")]
    NotFound { path: String },

    #[error("read error: {source}")]
    Read {
        #[from]
        source: std::io::Error,
    },

    #[error("TOML parse error: {source}")]
    Parse {
        #[from]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub overdue: OverdueConfig,
    pub interrupt: InterruptConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub default_duration_minutes: i64,
}

/// The grace margin and sweep cadence for the background overdue check are
/// deployment tuning knobs, not hard-coded constants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OverdueConfig {
    pub grace_seconds: i64,
    pub sweep_interval_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InterruptConfig {
    /// When false, only an operator with direct daemon access may interrupt;
    /// client interrupt requests are rejected.
    pub user_triggered: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_duration_minutes: 25,
        }
    }
}

impl Default for OverdueConfig {
    fn default() -> Self {
        Self {
            grace_seconds: 30,
            sweep_interval_seconds: 30,
        }
    }
}

impl Default for InterruptConfig {
    fn default() -> Self {
        Self {
            user_triggered: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dwell")
            .join("config.toml")
    }
}
