//! Assignment statistics

use std::sync::Arc;

use crate::error::Result;
use crate::model::{PrStats, ReviewerStats};
use crate::store::StatisticsStore;
use crate::tx::TxManager;

use super::log_failure;

/// Read-only aggregate queries
pub struct StatisticsService<S> {
    tx: TxManager<S>,
}

impl<S: StatisticsStore> StatisticsService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            tx: TxManager::new(store),
        }
    }

    /// Assignment counts for every user, busiest first
    pub async fn reviewers(&self) -> Result<Vec<ReviewerStats>> {
        let store = Arc::clone(self.tx.store());

        self.tx
            .read_committed(None, move |tx| {
                Box::pin(async move { Ok(store.reviewer_stats(Some(tx)).await?) })
            })
            .await
            .map_err(|e| log_failure("reviewer_statistics", e))
    }

    /// Reviewer counts for every pull request, most reviewed first
    pub async fn pull_requests(&self) -> Result<Vec<PrStats>> {
        let store = Arc::clone(self.tx.store());

        self.tx
            .read_committed(None, move |tx| {
                Box::pin(async move { Ok(store.pull_request_stats(Some(tx)).await?) })
            })
            .await
            .map_err(|e| log_failure("pull_request_statistics", e))
    }
}
