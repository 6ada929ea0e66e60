use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::TransactionHandle;

/// Executor wraps a database transaction for use by repositories.
///
/// Every repository built inside a unit of work receives a clone of the
/// same executor, so they all run their statements against one PostgreSQL
/// transaction. Once the transaction is committed or rolled back the slot
/// is empty and repositories still holding a clone get an error.
#[derive(Clone)]
pub struct Executor {
    pub tx: Arc<Mutex<Option<Transaction<'static, Postgres>>>>,
}

impl Executor {
    /// Creates a new Executor from a PostgreSQL transaction.
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    /// Whether the transaction is still open.
    pub async fn is_active(&self) -> bool {
        self.tx.lock().await.is_some()
    }

    /// Takes ownership of the transaction, leaving None in its place.
    /// This should only be called when committing or rolling back.
    pub(crate) async fn take_transaction(
        &self,
    ) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.tx.lock().await.take().ok_or(sqlx::Error::PoolClosed)
    }

    /// Whether both executors wrap the same transaction.
    pub fn same_transaction(&self, other: &Executor) -> bool {
        Arc::ptr_eq(&self.tx, &other.tx)
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor").finish_non_exhaustive()
    }
}

#[async_trait]
impl TransactionHandle for Executor {
    async fn commit(&self) -> Result<(), sqlx::Error> {
        let tx = self.take_transaction().await?;
        tx.commit().await
    }

    async fn rollback(&self) -> Result<bool, sqlx::Error> {
        let tx = self.tx.lock().await.take();
        match tx {
            Some(tx) => tx.rollback().await.map(|()| true),
            None => Ok(false),
        }
    }

    fn release(&self) {
        // Dropping the transaction makes sqlx roll it back once the
        // connection goes back to the pool.
        if let Ok(mut guard) = self.tx.try_lock() {
            guard.take();
        }
    }
}
