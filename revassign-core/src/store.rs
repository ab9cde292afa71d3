//! Store capabilities the engine depends on
//!
//! A backend implements [`Transactor`] once and the repository traits on top
//! of it. Every repository call takes the transaction handle explicitly:
//! `Some(tx)` runs the statement inside that transaction, `None` runs it in
//! autocommit mode. Engine operations always pass `Some`.
//!
//! Implementations must roll a transaction back when its handle is dropped
//! without being committed; cancellation of an operation relies on that.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{PrStats, PullRequest, PullRequestShort, ReviewerStats, Team, User};

/// Result type for store calls
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Transaction isolation levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolationLevel {
    /// Each statement sees data committed before it started
    #[default]
    ReadCommitted,
    /// Transactions behave as if run one after another
    Serializable,
}

/// Begin, commit and roll back transactions
#[async_trait]
pub trait Transactor: Send + Sync + 'static {
    /// Handle for an open transaction
    type Transaction: Send;

    async fn begin_transaction(&self, isolation: IsolationLevel) -> StoreResult<Self::Transaction>;
    async fn commit_transaction(&self, tx: Self::Transaction) -> StoreResult<()>;
    async fn rollback_transaction(&self, tx: Self::Transaction) -> StoreResult<()>;
}

/// Directory lookups and user writes
#[async_trait]
pub trait UserStore: Transactor {
    /// Fetch a user; `NotFound` if absent
    async fn get_user(
        &self,
        id: Uuid,
        tx: Option<&mut Self::Transaction>,
    ) -> StoreResult<User>;

    /// Active members of `team_name` in insertion order
    async fn list_active_by_team(
        &self,
        team_name: &str,
        tx: Option<&mut Self::Transaction>,
    ) -> StoreResult<Vec<User>>;

    /// Flip the active flag; `NoRowsAffected` if the user is absent
    async fn set_user_active(
        &self,
        id: Uuid,
        is_active: bool,
        tx: Option<&mut Self::Transaction>,
    ) -> StoreResult<()>;

    /// Insert users or update existing ones in place
    async fn upsert_users(
        &self,
        users: &[User],
        tx: Option<&mut Self::Transaction>,
    ) -> StoreResult<()>;
}

/// Team rows
#[async_trait]
pub trait TeamStore: Transactor {
    /// Insert a team; `UniqueViolation` if the name is taken
    async fn create_team(
        &self,
        team_name: &str,
        tx: Option<&mut Self::Transaction>,
    ) -> StoreResult<()>;

    /// Team with all members (active or not); `NotFound` if absent
    async fn get_team(
        &self,
        team_name: &str,
        tx: Option<&mut Self::Transaction>,
    ) -> StoreResult<Team>;
}

/// Pull requests and reviewer links
#[async_trait]
pub trait PullRequestStore: Transactor {
    /// Insert the pull request row; `UniqueViolation` on id collision
    async fn create_pull_request(
        &self,
        pr: &PullRequest,
        tx: Option<&mut Self::Transaction>,
    ) -> StoreResult<()>;

    /// Insert one link per entry of `pr.assigned_reviewers`
    async fn add_reviewers(
        &self,
        pr: &PullRequest,
        tx: Option<&mut Self::Transaction>,
    ) -> StoreResult<()>;

    /// Fetch a pull request with its reviewers; `NotFound` if absent
    async fn get_pull_request(
        &self,
        id: Uuid,
        tx: Option<&mut Self::Transaction>,
    ) -> StoreResult<PullRequest>;

    /// Persist `pr.status`/`pr.merged_at` if the row is still open.
    ///
    /// Returns `false` when the row was no longer open, so a concurrent
    /// merge won the race.
    async fn mark_merged(
        &self,
        pr: &PullRequest,
        tx: Option<&mut Self::Transaction>,
    ) -> StoreResult<bool>;

    /// Point the `(pr_id, old_reviewer)` link at `new_reviewer`.
    ///
    /// The update is conditional on the link existing; `NoRowsAffected`
    /// otherwise.
    async fn replace_reviewer(
        &self,
        pr_id: Uuid,
        old_reviewer: Uuid,
        new_reviewer: Uuid,
        tx: Option<&mut Self::Transaction>,
    ) -> StoreResult<()>;

    /// Summaries of the pull requests `reviewer_id` is assigned to
    async fn list_by_reviewer(
        &self,
        reviewer_id: Uuid,
        tx: Option<&mut Self::Transaction>,
    ) -> StoreResult<Vec<PullRequestShort>>;
}

/// Aggregate read queries
#[async_trait]
pub trait StatisticsStore: Transactor {
    async fn reviewer_stats(
        &self,
        tx: Option<&mut Self::Transaction>,
    ) -> StoreResult<Vec<ReviewerStats>>;

    async fn pull_request_stats(
        &self,
        tx: Option<&mut Self::Transaction>,
    ) -> StoreResult<Vec<PrStats>>;
}
