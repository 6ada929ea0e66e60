use crate::registry::RepositoryName;

/// Error type for registry lookups and the transaction lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum UnitOfWorkError {
    #[error("Repository not registered: {0}")]
    RepositoryNotRegistered(RepositoryName),

    #[error("Repository already registered: {0}")]
    RepositoryAlreadyRegistered(RepositoryName),

    #[error("Invalid repository type for {name}: expected {expected}")]
    InvalidRepositoryType {
        name: RepositoryName,
        expected: &'static str,
    },

    #[error("Transaction begin failed: {0}")]
    TransactionBegin(#[source] sqlx::Error),

    #[error("Transaction commit failed: {0}")]
    TransactionCommit(#[source] sqlx::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type for unit of work operations
pub type UnitOfWorkResult<T> = Result<T, UnitOfWorkError>;
