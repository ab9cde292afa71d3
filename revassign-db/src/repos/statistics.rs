//! Aggregate queries over reviewer links

use async_trait::async_trait;
use revassign_core::model::{PrStats, ReviewerStats};
use revassign_core::store::{StatisticsStore, StoreResult};
use uuid::Uuid;

use super::pull_requests::parse_status;
use crate::error::classify;
use crate::{Database, Transaction};

#[derive(sqlx::FromRow)]
struct ReviewerStatsRow {
    reviewer_id: Uuid,
    reviewer_name: String,
    assigned_count: i64,
}

#[derive(sqlx::FromRow)]
struct PrStatsRow {
    pr_id: Uuid,
    pr_name: String,
    status: String,
    reviewer_count: i64,
}

#[async_trait]
impl StatisticsStore for Database {
    async fn reviewer_stats(&self, tx: Option<&mut Transaction>) -> StoreResult<Vec<ReviewerStats>> {
        let mut session = self.session(tx).await?;

        let rows = sqlx::query_as::<_, ReviewerStatsRow>(
            r#"
            SELECT u.id AS reviewer_id,
                   u.username AS reviewer_name,
                   COUNT(r.pr_id) AS assigned_count
            FROM users u
            LEFT JOIN pr_reviewers r ON r.reviewer_id = u.id
            GROUP BY u.id, u.username
            ORDER BY assigned_count DESC, u.rowid
            "#,
        )
        .fetch_all(session.conn())
        .await
        .map_err(|e| classify(e, "reviewer statistics"))?;

        Ok(rows
            .into_iter()
            .map(|row| ReviewerStats {
                reviewer_id: row.reviewer_id,
                reviewer_name: row.reviewer_name,
                assigned_count: row.assigned_count,
            })
            .collect())
    }

    async fn pull_request_stats(&self, tx: Option<&mut Transaction>) -> StoreResult<Vec<PrStats>> {
        let mut session = self.session(tx).await?;

        let rows = sqlx::query_as::<_, PrStatsRow>(
            r#"
            SELECT p.id AS pr_id,
                   p.name AS pr_name,
                   p.status AS status,
                   COUNT(r.reviewer_id) AS reviewer_count
            FROM pull_requests p
            LEFT JOIN pr_reviewers r ON r.pr_id = p.id
            GROUP BY p.id, p.name, p.status
            ORDER BY reviewer_count DESC, p.rowid
            "#,
        )
        .fetch_all(session.conn())
        .await
        .map_err(|e| classify(e, "pull request statistics"))?;

        rows.into_iter()
            .map(|row| -> StoreResult<PrStats> {
                Ok(PrStats {
                    pr_id: row.pr_id,
                    pr_name: row.pr_name,
                    status: parse_status(&row.status)?,
                    reviewer_count: row.reviewer_count,
                })
            })
            .collect()
    }
}
