//! Team operations

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::{Team, User};
use crate::store::{TeamStore, UserStore};
use crate::tx::TxManager;

use super::log_failure;

/// Team creation and lookup
pub struct TeamService<S> {
    tx: TxManager<S>,
}

impl<S> TeamService<S>
where
    S: TeamStore + UserStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            tx: TxManager::new(store),
        }
    }

    /// Create a team together with its members.
    ///
    /// Members that already exist are moved into the new team and take the
    /// username and active flag given here. Fails with `AlreadyExists` if the
    /// team name is taken, in which case no member is touched.
    pub async fn create(&self, team: Team) -> Result<()> {
        let store = Arc::clone(self.tx.store());

        self.tx
            .read_committed(None, move |tx| {
                Box::pin(async move {
                    store
                        .create_team(&team.team_name, Some(&mut *tx))
                        .await
                        .map_err(|e| Error::classify(e, format!("team {}", team.team_name)))?;

                    let users: Vec<User> = team
                        .members
                        .iter()
                        .cloned()
                        .map(|m| m.into_user(&team.team_name))
                        .collect();
                    store.upsert_users(&users, Some(&mut *tx)).await?;

                    tracing::info!(
                        team = %team.team_name,
                        members = users.len(),
                        "Team created"
                    );
                    Ok(())
                })
            })
            .await
            .map_err(|e| log_failure("create_team", e))
    }

    /// Fetch a team with all of its members
    pub async fn get(&self, team_name: &str) -> Result<Team> {
        let store = Arc::clone(self.tx.store());
        let team_name = team_name.to_string();

        self.tx
            .read_committed(None, move |tx| {
                Box::pin(async move {
                    store
                        .get_team(&team_name, Some(tx))
                        .await
                        .map_err(|e| Error::classify(e, format!("team {}", team_name)))
                })
            })
            .await
            .map_err(|e| log_failure("get_team", e))
    }
}
