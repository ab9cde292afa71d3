//! SQLite persistence for revassign
//!
//! [`Database`] owns a connection pool and implements every store trait the
//! engine needs. Transactions are plain `sqlx` transactions: dropping one
//! without committing rolls it back.

pub mod connection;
pub mod error;
pub mod repos;

use std::path::Path;

use async_trait::async_trait;
use revassign_core::store::{IsolationLevel, StoreResult, Transactor};
use sqlx::sqlite::SqlitePool;
use sqlx::Sqlite;

pub use connection::DatabaseConfig;
pub use error::{Error, Result};

use error::classify;

/// Open transaction on a [`Database`]
pub type Transaction = sqlx::Transaction<'static, Sqlite>;

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database at `db_path` and run migrations
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        Self::connect(&DatabaseConfig::new(db_path.as_ref())).await
    }

    /// Open the database described by `config` and run migrations
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = connection::connect(config).await?;
        connection::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Statement that opens every engine transaction.
///
/// SQLite transactions are serializable whatever level is requested. A
/// deferred `BEGIN` upgrades to the write lock at the first write, and a
/// loser of that upgrade fails with `SQLITE_BUSY` without waiting. Taking the
/// write lock up front lets `busy_timeout` queue writers instead, so the
/// loser reads the winner's committed rows and fails its conditional update.
const BEGIN_STATEMENT: &str = "BEGIN IMMEDIATE";

#[async_trait]
impl Transactor for Database {
    type Transaction = Transaction;

    async fn begin_transaction(&self, isolation: IsolationLevel) -> StoreResult<Transaction> {
        tracing::trace!(?isolation, statement = BEGIN_STATEMENT, "Beginning transaction");
        self.pool
            .begin_with(BEGIN_STATEMENT)
            .await
            .map_err(|e| classify(e, "begin transaction"))
    }

    async fn commit_transaction(&self, tx: Transaction) -> StoreResult<()> {
        tx.commit()
            .await
            .map_err(|e| classify(e, "commit transaction"))
    }

    async fn rollback_transaction(&self, tx: Transaction) -> StoreResult<()> {
        tx.rollback()
            .await
            .map_err(|e| classify(e, "rollback transaction"))
    }
}
