//! TOML configuration for the CLI.
//!
//! Every section is optional; missing keys fall back to defaults and
//! command-line flags override file values.

use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::Level;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid log level '{0}'")]
    InvalidLevel(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Verbosity when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
    /// Newline-delimited JSON logs.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Used when a request omits `normative_context`.
    #[serde(default = "default_normative_context")]
    pub normative_context: String,
    /// Treat a FAIL decision as a failing exit code.
    #[serde(default)]
    pub strict: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            normative_context: default_normative_context(),
            strict: false,
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}

fn default_normative_context() -> String {
    "apa7".to_string()
}

impl Config {
    /// Loads `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            None => Config::default(),
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })?;
                Self::parse(&text)?
            }
        };
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        Level::from_str(&config.logging.level)
            .map_err(|_| ConfigError::InvalidLevel(config.logging.level.clone()))?;
        Ok(config)
    }

    pub fn log_level(&self) -> Level {
        Level::from_str(&self.logging.level).unwrap_or(Level::WARN)
    }
}
