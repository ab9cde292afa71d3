//! Pull request operations: creation, merge, reassignment, reviewer listing

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result, StoreError};
use crate::lifecycle::{MergeOutcome, Mutation};
use crate::model::{PullRequest, PullRequestShort};
use crate::selection::{
    select_replacement, select_reviewers, RandomSource, ThreadRandom, DEFAULT_REVIEWER_QUOTA,
};
use crate::store::{PullRequestStore, UserStore};
use crate::tx::TxManager;

use super::log_failure;

/// Outcome of a successful reassignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reassignment {
    /// The pull request as stored after the replacement
    #[serde(rename = "pr")]
    pub pull_request: PullRequest,
    /// The reviewer that took the old reviewer's place
    pub replaced_by: Uuid,
}

/// Pull request operations over a transactional store
pub struct PullRequestService<S> {
    tx: TxManager<S>,
    random: Arc<dyn RandomSource>,
    quota: usize,
}

impl<S> PullRequestService<S>
where
    S: PullRequestStore + UserStore,
{
    /// Create a service with the default quota and a thread-local RNG
    pub fn new(store: Arc<S>) -> Self {
        Self {
            tx: TxManager::new(store),
            random: Arc::new(ThreadRandom),
            quota: DEFAULT_REVIEWER_QUOTA,
        }
    }

    /// Use `random` to pick replacement reviewers
    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Assign at most `quota` reviewers at creation
    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = quota;
        self
    }

    /// Create an open pull request and assign its initial reviewers.
    ///
    /// Reviewers are the first active teammates of the author, in directory
    /// order, up to the quota. A team with no other active members yields a
    /// pull request without reviewers.
    pub async fn create(
        &self,
        id: Uuid,
        name: impl Into<String>,
        author_id: Uuid,
    ) -> Result<PullRequest> {
        let name = name.into();
        let store = Arc::clone(self.tx.store());
        let quota = self.quota;

        self.tx
            .read_committed(None, move |tx| {
                Box::pin(async move {
                    let author = store
                        .get_user(author_id, Some(&mut *tx))
                        .await
                        .map_err(|e| Error::classify(e, format!("author {}", author_id)))?;
                    if !author.is_active {
                        return Err(Error::NotActive(format!("author {}", author_id)));
                    }

                    let members = store
                        .list_active_by_team(&author.team_name, Some(&mut *tx))
                        .await?;
                    let reviewers = select_reviewers(&members, author_id, quota);
                    let pr = PullRequest::new(id, name, author_id).with_reviewers(reviewers);

                    store
                        .create_pull_request(&pr, Some(&mut *tx))
                        .await
                        .map_err(|e| Error::classify(e, format!("pull request {}", id)))?;
                    store.add_reviewers(&pr, Some(&mut *tx)).await?;

                    tracing::info!(
                        pr_id = %id,
                        author = %author_id,
                        team = %author.team_name,
                        reviewers = ?pr.assigned_reviewers,
                        "Pull request created"
                    );

                    Ok(store.get_pull_request(id, Some(&mut *tx)).await?)
                })
            })
            .await
            .map_err(|e| log_failure("create_pull_request", e))
    }

    /// Merge a pull request.
    ///
    /// Merging is idempotent: an already merged pull request is returned
    /// as-is, keeping its first merge timestamp.
    pub async fn merge(&self, id: Uuid) -> Result<PullRequest> {
        let store = Arc::clone(self.tx.store());

        self.tx
            .read_committed(None, move |tx| {
                Box::pin(async move {
                    let mut pr = store
                        .get_pull_request(id, Some(&mut *tx))
                        .await
                        .map_err(|e| Error::classify(e, format!("pull request {}", id)))?;

                    if pr.merge(Utc::now()) == MergeOutcome::Unchanged {
                        return Ok(pr);
                    }

                    if !store.mark_merged(&pr, Some(&mut *tx)).await? {
                        tracing::debug!(pr_id = %id, "Pull request merged concurrently");
                    }

                    Ok(store.get_pull_request(id, Some(&mut *tx)).await?)
                })
            })
            .await
            .map_err(|e| log_failure("merge_pull_request", e))
    }

    /// Replace `old_reviewer_id` on `pr_id` with a random active teammate.
    ///
    /// The replacement comes from the old reviewer's team and is never the
    /// author or anyone already reviewing. The link update only applies if
    /// the old reviewer is still assigned when it runs; if a concurrent
    /// reassignment got there first this fails with `NoAssigned`.
    pub async fn reassign(&self, old_reviewer_id: Uuid, pr_id: Uuid) -> Result<Reassignment> {
        let store = Arc::clone(self.tx.store());
        let random = Arc::clone(&self.random);

        self.tx
            .read_committed(None, move |tx| {
                Box::pin(async move {
                    let pr = store
                        .get_pull_request(pr_id, Some(&mut *tx))
                        .await
                        .map_err(|e| Error::classify(e, format!("pull request {}", pr_id)))?;
                    pr.ensure_permits(Mutation::Reassign)?;

                    let old = store
                        .get_user(old_reviewer_id, Some(&mut *tx))
                        .await
                        .map_err(|e| Error::classify(e, format!("reviewer {}", old_reviewer_id)))?;

                    let members = store
                        .list_active_by_team(&old.team_name, Some(&mut *tx))
                        .await?;

                    let replaced_by = select_replacement(
                        &members,
                        pr.author_id,
                        &pr.assigned_reviewers,
                        random.as_ref(),
                    )
                    .ok_or_else(|| {
                        Error::NoCandidate(format!(
                            "no active replacement for {} in team {}",
                            old_reviewer_id, old.team_name
                        ))
                    })?;

                    store
                        .replace_reviewer(pr_id, old_reviewer_id, replaced_by, Some(&mut *tx))
                        .await
                        .map_err(|e| match e {
                            StoreError::NoRowsAffected(_) => Error::NoAssigned(format!(
                                "{} is not a reviewer of {}",
                                old_reviewer_id, pr_id
                            )),
                            other => Error::Store(other),
                        })?;

                    tracing::info!(
                        pr_id = %pr_id,
                        old_reviewer = %old_reviewer_id,
                        new_reviewer = %replaced_by,
                        "Reviewer reassigned"
                    );

                    let pull_request = store.get_pull_request(pr_id, Some(&mut *tx)).await?;
                    Ok(Reassignment {
                        pull_request,
                        replaced_by,
                    })
                })
            })
            .await
            .map_err(|e| log_failure("reassign_reviewer", e))
    }

    /// Pull requests `user_id` currently reviews
    pub async fn list_by_reviewer(&self, user_id: Uuid) -> Result<Vec<PullRequestShort>> {
        let store = Arc::clone(self.tx.store());

        self.tx
            .read_committed(None, move |tx| {
                Box::pin(async move { Ok(store.list_by_reviewer(user_id, Some(tx)).await?) })
            })
            .await
            .map_err(|e| log_failure("list_pull_requests_by_reviewer", e))
    }
}
