//! Runtime configuration.
//!
//! Settings come from, in increasing priority:
//!
//! 1. Built-in defaults.
//! 2. The TOML config file (`lockbox.toml` unless `--config` says otherwise).
//! 3. Environment variables (`LOCKBOX_DB_PATH`, `LOCKBOX_LOG`,
//!    `LOCKBOX_PASSWORD_LENGTH`), including ones loaded from `.env`.
//! 4. Command-line flags, applied by the caller.
//!
//! ```toml
//! [storage]
//! database_path = "data/lockbox.db"
//!
//! [logging]
//! level = "warn"
//!
//! [generator]
//! length = 16
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::generator::DEFAULT_LENGTH;

/// Default location of the config file.
pub const DEFAULT_CONFIG_PATH: &str = "lockbox.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub generator: GeneratorConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// SQLite database file holding the credentials.
    pub database_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default `tracing` filter; `RUST_LOG` still takes precedence.
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Length of suggested passwords.
    pub length: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/lockbox.db"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
        }
    }
}

impl Config {
    /// Load the config file at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Parse config from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment overrides, reading variables through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("LOCKBOX_DB_PATH").filter(|v| !v.trim().is_empty()) {
            self.storage.database_path = PathBuf::from(path);
        }
        if let Some(level) = lookup("LOCKBOX_LOG").filter(|v| !v.trim().is_empty()) {
            self.logging.level = level;
        }
        if let Some(raw) = lookup("LOCKBOX_PASSWORD_LENGTH") {
            self.generator.length = raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("invalid LOCKBOX_PASSWORD_LENGTH '{raw}'"))?;
        }
        Ok(())
    }
}
