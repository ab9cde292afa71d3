//! Error types for database operations

use revassign_core::StoreError;
use thiserror::Error;

/// Database error types
#[derive(Error, Debug)]
pub enum Error {
    /// SQLx database error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for StoreError {
    fn from(err: Error) -> Self {
        match err {
            Error::Sqlx(e) => classify(e, "statement"),
            other => StoreError::backend(other),
        }
    }
}

/// Sort a driver error into the categories the engine understands.
///
/// `subject` describes the row the statement was looking for and only
/// shows up in the message.
pub(crate) fn classify(err: sqlx::Error, subject: &str) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound(subject.to_string()),
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::UniqueViolation(format!("{}: {}", subject, db.message()))
        }
        e => StoreError::backend(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_is_not_found() {
        let err = classify(sqlx::Error::RowNotFound, "user 42");
        assert!(matches!(err, StoreError::NotFound(ref s) if s == "user 42"));
    }

    #[test]
    fn test_other_errors_pass_through() {
        let err = classify(sqlx::Error::PoolTimedOut, "pull request");
        assert!(matches!(err, StoreError::Backend(_)));
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_io_error_becomes_backend() {
        let err: StoreError = Error::Io("read-only filesystem".to_string()).into();
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
