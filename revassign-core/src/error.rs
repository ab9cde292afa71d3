//! Error types for the assignment engine
//!
//! Two layers live here. [`StoreError`] is what a store implementation
//! reports: the handful of persistence faults the engine knows how to
//! classify, plus an opaque backend error for everything else. [`Error`] is
//! what engine operations return to callers; its [`ErrorKind`] is the stable
//! contract, the message is diagnostic only.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Persistence faults reported by a store implementation
#[derive(Error, Debug)]
pub enum StoreError {
    /// A lookup matched no row
    #[error("no rows matched: {0}")]
    NotFound(String),

    /// An insert collided with an existing identity
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// An update meant to touch exactly one row touched none
    #[error("no rows affected: {0}")]
    NoRowsAffected(String),

    /// Anything the store could not classify
    #[error("{0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wrap an arbitrary backend error
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        StoreError::Backend(err.into())
    }
}

/// Stable, caller-facing classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Referenced entity is absent
    NotFound,
    /// Actor is disqualified by inactivity
    NotActive,
    /// Identity collision on creation
    AlreadyExists,
    /// Mutation forbidden on a merged pull request
    AlreadyMerged,
    /// Selection pool is exhausted
    NoCandidate,
    /// Expected reviewer link was absent at mutation time
    NoAssigned,
    /// Unclassified persistence or runtime fault
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::NotActive => "NOT_ACTIVE",
            ErrorKind::AlreadyExists => "ALREADY_EXISTS",
            ErrorKind::AlreadyMerged => "PR_MERGED",
            ErrorKind::NoCandidate => "NO_CANDIDATE",
            ErrorKind::NoAssigned => "NOT_ASSIGNED",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for engine operations
#[derive(Error, Debug)]
pub enum Error {
    /// Referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// User exists but is inactive
    #[error("Not active: {0}")]
    NotActive(String),

    /// Entity with the same identity already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Pull request is merged and can no longer be changed
    #[error("Pull request {0} is merged")]
    AlreadyMerged(String),

    /// No eligible replacement reviewer
    #[error("No candidate: {0}")]
    NoCandidate(String),

    /// Reviewer is not assigned to the pull request
    #[error("Not assigned: {0}")]
    NoAssigned(String),

    /// Unclassified store fault, passed through with its detail
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A unit of work panicked inside a transaction
    #[error("panic recovered: {0}")]
    Panic(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify this error for control flow
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::NotActive(_) => ErrorKind::NotActive,
            Error::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Error::AlreadyMerged(_) => ErrorKind::AlreadyMerged,
            Error::NoCandidate(_) => ErrorKind::NoCandidate,
            Error::NoAssigned(_) => ErrorKind::NoAssigned,
            Error::Store(_) | Error::Panic(_) | Error::Config(_) | Error::Io(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Map a store fault onto the domain taxonomy.
    ///
    /// `subject` names the entity the failed statement was about; it ends up
    /// in the message of the classified variants. `NoRowsAffected` has no
    /// universal meaning, so callers that expect it translate it themselves
    /// before falling back to this.
    pub fn classify(err: StoreError, subject: impl std::fmt::Display) -> Self {
        match err {
            StoreError::NotFound(_) => Error::NotFound(subject.to_string()),
            StoreError::UniqueViolation(_) => Error::AlreadyExists(subject.to_string()),
            other => Error::Store(other),
        }
    }
}
