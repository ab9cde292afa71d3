//! User directory queries

use async_trait::async_trait;
use revassign_core::model::User;
use revassign_core::store::{StoreResult, UserStore};
use revassign_core::StoreError;
use uuid::Uuid;

use crate::error::classify;
use crate::{Database, Transaction};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    team_name: String,
    is_active: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            team_name: row.team_name,
            is_active: row.is_active,
        }
    }
}

#[async_trait]
impl UserStore for Database {
    async fn get_user(&self, id: Uuid, tx: Option<&mut Transaction>) -> StoreResult<User> {
        let mut session = self.session(tx).await?;

        sqlx::query_as::<_, UserRow>(
            "SELECT id, username, team_name, is_active FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_one(session.conn())
        .await
        .map(User::from)
        .map_err(|e| classify(e, &format!("user {}", id)))
    }

    async fn list_active_by_team(
        &self,
        team_name: &str,
        tx: Option<&mut Transaction>,
    ) -> StoreResult<Vec<User>> {
        let mut session = self.session(tx).await?;

        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, team_name, is_active
            FROM users
            WHERE team_name = ? AND is_active = 1
            ORDER BY rowid
            "#,
        )
        .bind(team_name)
        .fetch_all(session.conn())
        .await
        .map_err(|e| classify(e, &format!("members of {}", team_name)))?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn set_user_active(
        &self,
        id: Uuid,
        is_active: bool,
        tx: Option<&mut Transaction>,
    ) -> StoreResult<()> {
        let mut session = self.session(tx).await?;

        let result = sqlx::query("UPDATE users SET is_active = ? WHERE id = ?")
            .bind(is_active)
            .bind(id)
            .execute(session.conn())
            .await
            .map_err(|e| classify(e, &format!("user {}", id)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NoRowsAffected(format!("user {}", id)));
        }

        Ok(())
    }

    async fn upsert_users(&self, users: &[User], tx: Option<&mut Transaction>) -> StoreResult<()> {
        let mut session = self.session(tx).await?;

        for user in users {
            sqlx::query(
                r#"
                INSERT INTO users (id, username, team_name, is_active)
                VALUES (?, ?, ?, ?)
                ON CONFLICT (id) DO UPDATE SET
                    username = excluded.username,
                    team_name = excluded.team_name,
                    is_active = excluded.is_active
                "#,
            )
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.team_name)
            .bind(user.is_active)
            .execute(session.conn())
            .await
            .map_err(|e| classify(e, &format!("user {}", user.id)))?;
        }

        tracing::debug!(count = users.len(), "Upserted users");
        Ok(())
    }
}
