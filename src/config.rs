//! Configuration management.
//!
//! This module handles loading, parsing, and validation of the TOML
//! configuration file. Every field has a default so a missing or partial file
//! always yields a usable configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constants::{CONFIG_DIR, CONFIG_FILE, DEFAULT_PAGE_SIZE};
use crate::sync::hierarchy::IndentPlacement;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Sync configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Page size for remote listings.
    pub page_size: u32,
    /// Prune stale local entities at the end of every sync pass.
    pub delete_stale_on_sync: bool,
    /// Where an indented task lands among its new siblings: "start" or "end".
    pub indent_placement: String,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file; in-memory storage when unset.
    pub database_path: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable file logging.
    pub enabled: bool,
    /// Log level: "error", "warn", "info", "debug" or "trace".
    pub level: String,
    /// Log file path; defaults next to the working directory.
    pub file: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            delete_stale_on_sync: false,
            indent_placement: "end".to_string(),
        }
    }
}

impl SyncConfig {
    /// Parsed indent placement policy; unknown values fall back to the
    /// default placement.
    pub fn indent_placement(&self) -> IndentPlacement {
        match self.indent_placement.as_str() {
            "start" => IndentPlacement::Start,
            "end" => IndentPlacement::End,
            _ => IndentPlacement::default(),
        }
    }
}

impl Config {
    /// Default location of the configuration file.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load the configuration from the default location, falling back to
    /// defaults when no file exists.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load the configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.sync.page_size == 0 {
            anyhow::bail!("sync.page_size must be at least 1");
        }
        match self.sync.indent_placement.as_str() {
            "start" | "end" => Ok(()),
            other => anyhow::bail!("sync.indent_placement must be \"start\" or \"end\", got \"{other}\""),
        }
    }
}
