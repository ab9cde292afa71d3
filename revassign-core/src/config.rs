//! Configuration management for revassign
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (REVASSIGN_*)
//! 3. Config file (~/.config/revassign/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::selection::DEFAULT_REVIEWER_QUOTA;
use crate::{Error, Result};

/// Database-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Path to the SQLite database file
    pub path: PathBuf,

    /// Maximum number of pooled connections
    pub max_connections: u32,

    /// How long a statement waits on a locked database before failing
    #[serde(with = "humantime_serde")]
    pub busy_timeout: Duration,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Reviewer assignment policy
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssignmentSettings {
    /// Reviewers assigned when a pull request is created
    pub reviewer_quota: usize,
}

impl Default for AssignmentSettings {
    fn default() -> Self {
        Self {
            reviewer_quota: DEFAULT_REVIEWER_QUOTA,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration
    pub database: DatabaseSettings,

    /// Assignment policy
    pub assignment: AssignmentSettings,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/revassign/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("revassign").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - REVASSIGN_DATABASE: Path to the database file
    /// - REVASSIGN_REVIEWER_QUOTA: Reviewers assigned at creation
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(path) = var("REVASSIGN_DATABASE") {
            self.database.path = PathBuf::from(path);
        }

        if let Some(quota) = var("REVASSIGN_REVIEWER_QUOTA") {
            self.assignment.reviewer_quota = quota.parse().map_err(|e| {
                Error::Config(format!("Invalid REVASSIGN_REVIEWER_QUOTA '{}': {}", quota, e))
            })?;
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, database: Option<PathBuf>) -> Self {
        if let Some(path) = database {
            self.database.path = path;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(database: Option<PathBuf>) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()?
            .with_cli_overrides(database))
    }
}

/// Default database location (`~/.cache/revassign/revassign.db`)
pub fn default_database_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("revassign")
        .join("revassign.db")
}
