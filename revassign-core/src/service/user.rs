//! User operations

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{Error, Result, StoreError};
use crate::model::User;
use crate::store::UserStore;
use crate::tx::TxManager;

use super::log_failure;

/// User activation
pub struct UserService<S> {
    tx: TxManager<S>,
}

impl<S: UserStore> UserService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            tx: TxManager::new(store),
        }
    }

    /// Set a user's active flag and return the updated record
    pub async fn set_active(&self, user_id: Uuid, is_active: bool) -> Result<User> {
        let store = Arc::clone(self.tx.store());

        self.tx
            .read_committed(None, move |tx| {
                Box::pin(async move {
                    store
                        .set_user_active(user_id, is_active, Some(&mut *tx))
                        .await
                        .map_err(|e| match e {
                            StoreError::NoRowsAffected(_) => {
                                Error::NotFound(format!("user {}", user_id))
                            }
                            other => Error::classify(other, format!("user {}", user_id)),
                        })?;

                    tracing::info!(user_id = %user_id, is_active, "User activity updated");
                    Ok(store.get_user(user_id, Some(&mut *tx)).await?)
                })
            })
            .await
            .map_err(|e| log_failure("set_user_active", e))
    }
}
