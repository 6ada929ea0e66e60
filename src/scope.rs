use std::any::type_name;

use crate::registry::{Repository, RepositoryRegistry};
use crate::{UnitOfWorkError, UnitOfWorkResult};

/// Repository lookup for one open transaction.
///
/// A scope is handed to the closure passed to
/// [`UnitOfWork::run`](crate::UnitOfWork::run) and lives no longer than that
/// call. It reads the bindings of the unit of work it came from; it does not
/// hold a copy of them.
pub struct TransactionScope<H> {
    handle: H,
    registry: RepositoryRegistry<H>,
}

impl<H: Clone + 'static> TransactionScope<H> {
    pub fn new(handle: H, registry: RepositoryRegistry<H>) -> Self {
        Self { handle, registry }
    }

    /// The transaction every repository from this scope is bound to.
    pub fn handle(&self) -> &H {
        &self.handle
    }

    /// Build the repository registered under `name`.
    ///
    /// The factory runs on every call; nothing is cached. Keep the returned
    /// value if you need the same instance twice.
    pub fn get(&self, name: &str) -> UnitOfWorkResult<Repository> {
        let factory = self.registry.factory(name)?;
        Ok(factory(&self.handle))
    }

    /// Build the repository registered under `name` as a `T`.
    ///
    /// Fails with [`UnitOfWorkError::InvalidRepositoryType`] when the
    /// factory produces something other than `T`.
    pub fn get_as<T: 'static>(&self, name: &str) -> UnitOfWorkResult<T> {
        let repository = self.get(name)?;
        repository
            .downcast::<T>()
            .map(|repository| *repository)
            .map_err(|_| UnitOfWorkError::InvalidRepositoryType {
                name: name.into(),
                expected: type_name::<T>(),
            })
    }
}
