//! Pull request and reviewer link queries

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use revassign_core::lifecycle::PrStatus;
use revassign_core::model::{PullRequest, PullRequestShort};
use revassign_core::store::{PullRequestStore, StoreResult};
use revassign_core::StoreError;
use uuid::Uuid;

use crate::error::classify;
use crate::{Database, Transaction};

#[derive(sqlx::FromRow)]
struct PullRequestRow {
    id: Uuid,
    name: String,
    author_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow)]
struct PullRequestShortRow {
    id: Uuid,
    name: String,
    author_id: Uuid,
    status: String,
}

pub(crate) fn parse_status(status: &str) -> StoreResult<PrStatus> {
    status.parse().map_err(StoreError::backend)
}

#[async_trait]
impl PullRequestStore for Database {
    async fn create_pull_request(
        &self,
        pr: &PullRequest,
        tx: Option<&mut Transaction>,
    ) -> StoreResult<()> {
        let mut session = self.session(tx).await?;

        sqlx::query(
            r#"
            INSERT INTO pull_requests (id, name, author_id, status, created_at, merged_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(pr.id)
        .bind(&pr.name)
        .bind(pr.author_id)
        .bind(pr.status.as_str())
        .bind(pr.created_at)
        .bind(pr.merged_at)
        .execute(session.conn())
        .await
        .map_err(|e| classify(e, &format!("pull request {}", pr.id)))?;

        Ok(())
    }

    async fn add_reviewers(&self, pr: &PullRequest, tx: Option<&mut Transaction>) -> StoreResult<()> {
        let mut session = self.session(tx).await?;
        let now = Utc::now();

        for reviewer in &pr.assigned_reviewers {
            sqlx::query("INSERT INTO pr_reviewers (pr_id, reviewer_id, assigned_at) VALUES (?, ?, ?)")
                .bind(pr.id)
                .bind(reviewer)
                .bind(now)
                .execute(session.conn())
                .await
                .map_err(|e| classify(e, &format!("reviewer {} on {}", reviewer, pr.id)))?;
        }

        Ok(())
    }

    async fn get_pull_request(
        &self,
        id: Uuid,
        tx: Option<&mut Transaction>,
    ) -> StoreResult<PullRequest> {
        let mut session = self.session(tx).await?;
        let subject = format!("pull request {}", id);

        let row = sqlx::query_as::<_, PullRequestRow>(
            r#"
            SELECT id, name, author_id, status, created_at, merged_at
            FROM pull_requests
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(session.conn())
        .await
        .map_err(|e| classify(e, &subject))?;

        let reviewers: Vec<(Uuid,)> =
            sqlx::query_as("SELECT reviewer_id FROM pr_reviewers WHERE pr_id = ? ORDER BY rowid")
                .bind(id)
                .fetch_all(session.conn())
                .await
                .map_err(|e| classify(e, &subject))?;

        Ok(PullRequest {
            id: row.id,
            name: row.name,
            author_id: row.author_id,
            status: parse_status(&row.status)?,
            assigned_reviewers: reviewers.into_iter().map(|(r,)| r).collect(),
            created_at: row.created_at,
            merged_at: row.merged_at,
        })
    }

    async fn mark_merged(&self, pr: &PullRequest, tx: Option<&mut Transaction>) -> StoreResult<bool> {
        let mut session = self.session(tx).await?;

        let result = sqlx::query(
            "UPDATE pull_requests SET status = ?, merged_at = ? WHERE id = ? AND status = ?",
        )
        .bind(pr.status.as_str())
        .bind(pr.merged_at)
        .bind(pr.id)
        .bind(PrStatus::Open.as_str())
        .execute(session.conn())
        .await
        .map_err(|e| classify(e, &format!("pull request {}", pr.id)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn replace_reviewer(
        &self,
        pr_id: Uuid,
        old_reviewer: Uuid,
        new_reviewer: Uuid,
        tx: Option<&mut Transaction>,
    ) -> StoreResult<()> {
        let mut session = self.session(tx).await?;

        let result = sqlx::query(
            r#"
            UPDATE pr_reviewers
            SET reviewer_id = ?, assigned_at = ?
            WHERE pr_id = ? AND reviewer_id = ?
            "#,
        )
        .bind(new_reviewer)
        .bind(Utc::now())
        .bind(pr_id)
        .bind(old_reviewer)
        .execute(session.conn())
        .await
        .map_err(|e| classify(e, &format!("reviewer {} on {}", new_reviewer, pr_id)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NoRowsAffected(format!(
                "reviewer {} on {}",
                old_reviewer, pr_id
            )));
        }

        Ok(())
    }

    async fn list_by_reviewer(
        &self,
        reviewer_id: Uuid,
        tx: Option<&mut Transaction>,
    ) -> StoreResult<Vec<PullRequestShort>> {
        let mut session = self.session(tx).await?;

        let rows = sqlx::query_as::<_, PullRequestShortRow>(
            r#"
            SELECT p.id, p.name, p.author_id, p.status
            FROM pr_reviewers r
            JOIN pull_requests p ON p.id = r.pr_id
            WHERE r.reviewer_id = ?
            ORDER BY p.rowid
            "#,
        )
        .bind(reviewer_id)
        .fetch_all(session.conn())
        .await
        .map_err(|e| classify(e, &format!("reviews of {}", reviewer_id)))?;

        rows.into_iter()
            .map(|row| -> StoreResult<PullRequestShort> {
                Ok(PullRequestShort {
                    id: row.id,
                    name: row.name,
                    author_id: row.author_id,
                    status: parse_status(&row.status)?,
                })
            })
            .collect()
    }
}
