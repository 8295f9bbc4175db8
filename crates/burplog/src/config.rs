//! Runtime configuration for the `burplog` CLI.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Output format for normalized records and for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Default tracing level; `RUST_LOG` takes precedence
    pub log_level: String,
    pub log_format: Format,
    /// How normalized records are printed
    pub output: Format,
    /// Treat skipped entries as a failure
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: Format::Text,
            output: Format::Text,
            strict: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, anyhow::Error> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.log_level.parse::<tracing::Level>().is_err() {
            anyhow::bail!(
                "Invalid log_level: '{}'. Expected one of: trace, debug, info, warn, error",
                self.log_level
            );
        }
        Ok(())
    }
}
