use futures::FutureExt;
use sqlx::PgPool;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use crate::registry::{RepositoryName, RepositoryRegistry};
use crate::{
    PostgresTransactionSource, TransactionHandle, TransactionOptions, TransactionScope,
    TransactionSource, UnitOfWorkError, UnitOfWorkResult,
};

/// Unit of Work pattern for managing database transactions.
///
/// Holds the repository registry and a transaction source. Each call to
/// [`UnitOfWork::run`] opens its own transaction, so one instance can be
/// shared by concurrent callers. The registry is locked internally, but
/// bindings changed while a transaction is running are visible to that
/// transaction's scope.
pub struct UnitOfWork<S: TransactionSource> {
    source: S,
    registry: RepositoryRegistry<S::Handle>,
    options: TransactionOptions,
}

/// Unit of work over a PostgreSQL pool.
pub type PostgresUnitOfWork = UnitOfWork<PostgresTransactionSource>;

impl UnitOfWork<PostgresTransactionSource> {
    /// Create a unit of work that opens its transactions on `pool`.
    pub fn postgres(pool: PgPool) -> Self {
        Self::new(PostgresTransactionSource::new(pool))
    }
}

impl<S: TransactionSource> UnitOfWork<S> {
    pub fn new(source: S) -> Self {
        Self::with_options(source, TransactionOptions::default())
    }

    /// Create a unit of work whose transactions all begin with `options`.
    pub fn with_options(source: S, options: TransactionOptions) -> Self {
        Self {
            source,
            registry: RepositoryRegistry::new(),
            options,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn options(&self) -> &TransactionOptions {
        &self.options
    }

    pub fn registry(&self) -> &RepositoryRegistry<S::Handle> {
        &self.registry
    }

    /// See [`RepositoryRegistry::register`].
    pub fn register<R, F>(
        &self,
        name: impl Into<RepositoryName>,
        factory: F,
    ) -> UnitOfWorkResult<()>
    where
        R: Send + 'static,
        F: Fn(&S::Handle) -> R + Send + Sync + 'static,
    {
        self.registry.register(name, factory)
    }

    pub fn remove(&self, name: &str) -> UnitOfWorkResult<()> {
        self.registry.remove(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.registry.has(name)
    }

    pub fn clear(&self) {
        self.registry.clear()
    }

    /// Run `work` inside a new transaction.
    ///
    /// The transaction is committed when `work` returns `Ok` and the value is
    /// handed back. When `work` returns an error, panics, or the returned
    /// future is dropped before completion, the transaction is rolled back.
    /// The error from `work` is returned as is; begin and commit failures are
    /// converted into `E`.
    pub async fn run<F, Fut, T, E>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(TransactionScope<S::Handle>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<UnitOfWorkError>,
    {
        let handle = self
            .source
            .begin(&self.options)
            .await
            .map_err(UnitOfWorkError::TransactionBegin)?;
        tracing::debug!("transaction started");

        let guard = RollbackGuard::new(handle.clone());
        let scope = TransactionScope::new(handle.clone(), self.registry.clone());

        let outcome = AssertUnwindSafe(async move { work(scope).await })
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(value)) => {
                if let Err(err) = handle.commit().await {
                    guard.rollback().await;
                    return Err(UnitOfWorkError::TransactionCommit(err).into());
                }
                guard.disarm();
                tracing::debug!("transaction committed");
                Ok(value)
            }
            Ok(Err(err)) => {
                guard.rollback().await;
                Err(err)
            }
            Err(payload) => {
                guard.rollback().await;
                panic::resume_unwind(payload)
            }
        }
    }
}

/// Rolls the transaction back unless it was disarmed after a commit.
///
/// Dropping an armed guard (the `run` future was cancelled) releases the
/// handle, since nothing can be awaited in `drop`.
struct RollbackGuard<H: TransactionHandle> {
    handle: Option<H>,
}

impl<H: TransactionHandle> RollbackGuard<H> {
    fn new(handle: H) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    fn disarm(mut self) {
        self.handle = None;
    }

    /// A failed rollback is logged and swallowed so it never hides the error
    /// that caused it.
    async fn rollback(mut self) {
        if let Some(handle) = self.handle.take() {
            match handle.rollback().await {
                Ok(true) => tracing::debug!("transaction rolled back"),
                Ok(false) => {}
                Err(err) => tracing::warn!(error = %err, "transaction rollback failed"),
            }
        }
    }
}

impl<H: TransactionHandle> Drop for RollbackGuard<H> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            tracing::debug!("unit of work dropped, releasing transaction");
            handle.release();
        }
    }
}
