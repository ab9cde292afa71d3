//! Engine operations
//!
//! Each operation runs as one read-committed unit of work through
//! [`TxManager`](crate::tx::TxManager): either everything it wrote is
//! committed, or nothing is.

pub mod pull_request;
pub mod statistics;
pub mod team;
pub mod user;

use std::sync::Arc;

pub use pull_request::{PullRequestService, Reassignment};
pub use statistics::StatisticsService;
pub use team::TeamService;
pub use user::UserService;

use crate::error::Error;
use crate::selection::{RandomSource, DEFAULT_REVIEWER_QUOTA};
use crate::store::{PullRequestStore, StatisticsStore, TeamStore, UserStore};

/// All engine services over one store
pub struct Engine<S> {
    pub pull_requests: PullRequestService<S>,
    pub teams: TeamService<S>,
    pub users: UserService<S>,
    pub statistics: StatisticsService<S>,
}

impl<S> Engine<S>
where
    S: PullRequestStore + UserStore + TeamStore + StatisticsStore,
{
    /// Build every service with the default reviewer quota
    pub fn new(store: Arc<S>) -> Self {
        Self::with_quota(store, DEFAULT_REVIEWER_QUOTA)
    }

    /// Build every service, assigning at most `quota` reviewers on creation
    pub fn with_quota(store: Arc<S>, quota: usize) -> Self {
        Self {
            pull_requests: PullRequestService::new(Arc::clone(&store)).with_quota(quota),
            teams: TeamService::new(Arc::clone(&store)),
            users: UserService::new(Arc::clone(&store)),
            statistics: StatisticsService::new(store),
        }
    }

    /// Replace the random source used for reassignment
    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.pull_requests = self.pull_requests.with_random(random);
        self
    }
}

/// Log a failed operation and hand the error back
pub(crate) fn log_failure(operation: &'static str, err: Error) -> Error {
    tracing::error!(operation, kind = %err.kind(), error = %err, "Operation failed");
    err
}
