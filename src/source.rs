use async_trait::async_trait;
use sqlx::PgPool;

use crate::{Executor, TransactionOptions};

/// An open transaction that repositories are bound to.
///
/// Handles are cloned into every repository built for the transaction, so
/// all clones must refer to the same underlying transaction.
#[async_trait]
pub trait TransactionHandle: Clone + Send + Sync + 'static {
    /// Commit the transaction.
    async fn commit(&self) -> Result<(), sqlx::Error>;

    /// Roll the transaction back.
    ///
    /// Returns `false` without doing anything when the transaction was
    /// already committed or rolled back.
    async fn rollback(&self) -> Result<bool, sqlx::Error>;

    /// Abandon the transaction without awaiting anything.
    ///
    /// Called when a unit of work is dropped before it finished, e.g. when
    /// its future is cancelled. Nothing may be committed afterwards.
    fn release(&self) {}
}

/// Something that can open new transactions.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    type Handle: TransactionHandle;

    /// Begin a new transaction configured with `options`.
    async fn begin(&self, options: &TransactionOptions) -> Result<Self::Handle, sqlx::Error>;
}

/// Transaction source backed by a PostgreSQL connection pool.
#[derive(Clone, Debug)]
pub struct PostgresTransactionSource {
    pool: PgPool,
}

impl PostgresTransactionSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TransactionSource for PostgresTransactionSource {
    type Handle = Executor;

    async fn begin(&self, options: &TransactionOptions) -> Result<Executor, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // SET TRANSACTION has to run before any other statement.
        if let Some(sql) = options.set_transaction_sql() {
            sqlx::query(&sql).execute(&mut *tx).await?;
        }
        if let Some(sql) = options.statement_timeout_sql() {
            sqlx::query(&sql).execute(&mut *tx).await?;
        }

        Ok(Executor::new(tx))
    }
}
