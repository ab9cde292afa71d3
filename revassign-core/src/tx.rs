//! Transaction coordinator
//!
//! [`TxManager`] runs a unit of work inside a transaction and guarantees that
//! exactly one of commit or rollback happens for every transaction it opens.
//! A unit of work is a closure receiving the open handle and returning a
//! boxed future, so it can borrow the handle across awaits:
//!
//! ```ignore
//! let user = manager
//!     .read_committed(None, move |tx| {
//!         Box::pin(async move { Ok(store.get_user(id, Some(tx)).await?) })
//!     })
//!     .await?;
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::{Error, Result};
use crate::store::{IsolationLevel, Transactor};

/// Runs units of work inside store transactions
#[derive(Debug)]
pub struct TxManager<S> {
    store: Arc<S>,
}

impl<S> Clone for TxManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Transactor> TxManager<S> {
    /// Create a coordinator over `store`
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The store transactions are opened on
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Run `work` at read-committed isolation
    pub async fn read_committed<T, F>(
        &self,
        parent: Option<&mut S::Transaction>,
        work: F,
    ) -> Result<T>
    where
        T: Send,
        F: for<'t> FnOnce(&'t mut S::Transaction) -> BoxFuture<'t, Result<T>> + Send,
    {
        self.transaction(IsolationLevel::ReadCommitted, parent, work)
            .await
    }

    /// Run `work` inside a transaction.
    ///
    /// With a `parent` handle the work runs inline on it and the caller that
    /// opened the parent stays responsible for finishing it. Otherwise a new
    /// transaction is opened, committed if `work` returns `Ok`, and rolled
    /// back if it returns `Err` or panics. A panic becomes [`Error::Panic`].
    pub async fn transaction<T, F>(
        &self,
        isolation: IsolationLevel,
        parent: Option<&mut S::Transaction>,
        work: F,
    ) -> Result<T>
    where
        T: Send,
        F: for<'t> FnOnce(&'t mut S::Transaction) -> BoxFuture<'t, Result<T>> + Send,
    {
        if let Some(tx) = parent {
            tracing::trace!("Reusing active transaction");
            return work(tx).await;
        }

        let mut tx = self.store.begin_transaction(isolation).await?;
        tracing::debug!(?isolation, "Transaction started");

        let result = match AssertUnwindSafe(async { work(&mut tx).await })
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(panic = %message, "Unit of work panicked");
                Err(Error::Panic(message))
            }
        };

        match result {
            Ok(value) => {
                self.store.commit_transaction(tx).await?;
                tracing::debug!("Transaction committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.store.rollback_transaction(tx).await {
                    tracing::error!(error = %rollback_err, "Transaction rollback failed");
                } else {
                    tracing::debug!(error = %err, "Transaction rolled back");
                }
                Err(err)
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
