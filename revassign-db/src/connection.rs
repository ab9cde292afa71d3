//! Database connection and initialization

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use revassign_core::config::DatabaseSettings;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::{Error, Result};

/// Connection settings for the SQLite pool
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the database file
    pub path: PathBuf,
    /// Maximum pooled connections
    pub max_connections: u32,
    /// How long a statement waits on a locked database
    pub busy_timeout: Duration,
}

impl DatabaseConfig {
    /// Settings for a database at `path` with default pool limits
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseSettings::default().into()
    }
}

impl From<DatabaseSettings> for DatabaseConfig {
    fn from(settings: DatabaseSettings) -> Self {
        Self {
            path: settings.path,
            max_connections: settings.max_connections,
            busy_timeout: settings.busy_timeout,
        }
    }
}

/// Open a pool on `config.path`, creating the file and its directory if needed
pub(crate) async fn connect(config: &DatabaseConfig) -> Result<SqlitePool> {
    ensure_parent_dir(&config.path)?;

    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", config.path.display()))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(config.busy_timeout);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    tracing::debug!(
        path = %config.path.display(),
        max_connections = config.max_connections,
        "Opened database pool"
    );

    Ok(pool)
}

/// Apply pending schema migrations
pub(crate) async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| Error::Io(format!("Failed to create database directory: {}", e))),
        _ => Ok(()),
    }
}
