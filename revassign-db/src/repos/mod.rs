//! Store trait implementations for [`Database`](crate::Database)
//!
//! Each repository method takes an optional transaction. [`Session`] hides
//! the difference: it either borrows the caller's transaction or checks a
//! connection out of the pool for the duration of the call.

pub mod pull_requests;
pub mod statistics;
pub mod teams;
pub mod users;

use revassign_core::store::StoreResult;
use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqliteConnection};

use crate::error::classify;
use crate::{Database, Transaction};

/// Connection a single repository call runs on
pub(crate) enum Session<'a> {
    Borrowed(&'a mut Transaction),
    Pooled(PoolConnection<Sqlite>),
}

impl Session<'_> {
    pub(crate) fn conn(&mut self) -> &mut SqliteConnection {
        match self {
            Session::Borrowed(tx) => &mut ***tx,
            Session::Pooled(conn) => &mut **conn,
        }
    }
}

impl Database {
    pub(crate) async fn session<'a>(&self, tx: Option<&'a mut Transaction>) -> StoreResult<Session<'a>> {
        match tx {
            Some(tx) => Ok(Session::Borrowed(tx)),
            None => self
                .pool
                .acquire()
                .await
                .map(Session::Pooled)
                .map_err(|e| classify(e, "acquire connection")),
        }
    }
}
