//! Repository Unit of Work
//!
//! Runs a block of repository operations inside one database transaction.
//! Repository factories are registered by name on a [`UnitOfWork`]; every
//! call to [`UnitOfWork::run`] begins a transaction, hands the caller a
//! [`TransactionScope`] that builds repositories bound to it, and commits on
//! success or rolls back on error, panic or cancellation.
//!
//! ```ignore
//! let uow = PostgresUnitOfWork::postgres(pool);
//! uow.register("products", |executor: &Executor| ProductRepository::new(executor.clone()))?;
//!
//! uow.run(|scope| async move {
//!     let products = scope.get_as::<ProductRepository>("products")?;
//!     products.save(&product).await?;
//!     Ok::<_, UnitOfWorkError>(())
//! })
//! .await?;
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod registry;
pub mod scope;
pub mod source;
pub mod unit_of_work;

pub use config::{IsolationLevel, TransactionOptions};
pub use error::{UnitOfWorkError, UnitOfWorkResult};
pub use executor::Executor;
pub use registry::{Repository, RepositoryFactory, RepositoryName, RepositoryRegistry};
pub use scope::TransactionScope;
pub use source::{PostgresTransactionSource, TransactionHandle, TransactionSource};
pub use unit_of_work::{PostgresUnitOfWork, UnitOfWork};
