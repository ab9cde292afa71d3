//! Team queries

use async_trait::async_trait;
use revassign_core::model::{Team, TeamMember};
use revassign_core::store::{StoreResult, TeamStore};
use uuid::Uuid;

use crate::error::classify;
use crate::{Database, Transaction};

#[derive(sqlx::FromRow)]
struct MemberRow {
    id: Uuid,
    username: String,
    is_active: bool,
}

#[async_trait]
impl TeamStore for Database {
    async fn create_team(&self, team_name: &str, tx: Option<&mut Transaction>) -> StoreResult<()> {
        let mut session = self.session(tx).await?;

        sqlx::query("INSERT INTO teams (name) VALUES (?)")
            .bind(team_name)
            .execute(session.conn())
            .await
            .map_err(|e| classify(e, &format!("team {}", team_name)))?;

        Ok(())
    }

    async fn get_team(&self, team_name: &str, tx: Option<&mut Transaction>) -> StoreResult<Team> {
        let mut session = self.session(tx).await?;
        let subject = format!("team {}", team_name);

        let (name,): (String,) = sqlx::query_as("SELECT name FROM teams WHERE name = ?")
            .bind(team_name)
            .fetch_one(session.conn())
            .await
            .map_err(|e| classify(e, &subject))?;

        let members = sqlx::query_as::<_, MemberRow>(
            "SELECT id, username, is_active FROM users WHERE team_name = ? ORDER BY rowid",
        )
        .bind(&name)
        .fetch_all(session.conn())
        .await
        .map_err(|e| classify(e, &subject))?
        .into_iter()
        .map(|row| TeamMember::new(row.id, row.username).with_active(row.is_active))
        .collect();

        Ok(Team::new(name, members))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_team, setup_test_db};
    use revassign_core::store::UserStore;
    use revassign_core::StoreError;

    #[tokio::test]
    async fn test_create_duplicate_team() {
        let (db, _temp) = setup_test_db().await;
        db.create_team("backend", None).await.unwrap();

        let result = db.create_team("backend", None).await;
        assert!(matches!(result, Err(StoreError::UniqueViolation(_))));
    }

    #[tokio::test]
    async fn test_get_team_lists_inactive_members() {
        let (db, _temp) = setup_test_db().await;
        let ids = seed_team(&db, "backend", &["alice", "bob"]).await;
        db.set_user_active(ids[0], false, None).await.unwrap();

        let team = db.get_team("backend", None).await.unwrap();
        assert_eq!(team.team_name, "backend");
        assert_eq!(
            team.members,
            vec![
                TeamMember::new(ids[0], "alice").with_active(false),
                TeamMember::new(ids[1], "bob"),
            ]
        );
    }

    #[tokio::test]
    async fn test_get_empty_team() {
        let (db, _temp) = setup_test_db().await;
        db.create_team("empty", None).await.unwrap();

        let team = db.get_team("empty", None).await.unwrap();
        assert!(team.members.is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_team() {
        let (db, _temp) = setup_test_db().await;
        let result = db.get_team("nobody", None).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
