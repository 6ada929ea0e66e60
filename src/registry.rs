use parking_lot::RwLock;
use std::any::Any;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{UnitOfWorkError, UnitOfWorkResult};

/// A repository instance as produced by a factory.
///
/// The unit of work knows nothing about its shape; callers recover the
/// concrete type with [`TransactionScope::get_as`](crate::TransactionScope::get_as).
pub type Repository = Box<dyn Any + Send>;

/// Constructor binding a new repository to a transaction handle.
pub type RepositoryFactory<H> = Arc<dyn Fn(&H) -> Repository + Send + Sync>;

/// Name under which a repository factory is registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepositoryName(String);

impl RepositoryName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RepositoryName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RepositoryName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for RepositoryName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Name to factory bindings shared by a unit of work and its scopes.
///
/// Cloning the registry is cheap and yields another reference to the same
/// bindings, not a copy.
pub struct RepositoryRegistry<H> {
    factories: Arc<RwLock<HashMap<RepositoryName, RepositoryFactory<H>>>>,
}

impl<H: 'static> RepositoryRegistry<H> {
    pub fn new() -> Self {
        Self {
            factories: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a factory under `name`.
    ///
    /// Fails with [`UnitOfWorkError::RepositoryAlreadyRegistered`] if the
    /// name is taken; an existing binding is never overwritten.
    pub fn register<R, F>(
        &self,
        name: impl Into<RepositoryName>,
        factory: F,
    ) -> UnitOfWorkResult<()>
    where
        R: Send + 'static,
        F: Fn(&H) -> R + Send + Sync + 'static,
    {
        let name = name.into();
        let mut factories = self.factories.write();
        if factories.contains_key(&name) {
            return Err(UnitOfWorkError::RepositoryAlreadyRegistered(name));
        }

        let factory: RepositoryFactory<H> =
            Arc::new(move |handle: &H| Box::new(factory(handle)) as Repository);
        tracing::trace!(repository = %name, "registered repository factory");
        factories.insert(name, factory);
        Ok(())
    }

    /// Remove the factory registered under `name`.
    pub fn remove(&self, name: &str) -> UnitOfWorkResult<()> {
        match self.factories.write().remove(name) {
            Some(_) => Ok(()),
            None => Err(UnitOfWorkError::RepositoryNotRegistered(name.into())),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.factories.read().contains_key(name)
    }

    /// Remove every binding. The registry stays usable.
    pub fn clear(&self) {
        self.factories.write().clear();
    }

    pub fn len(&self) -> usize {
        self.factories.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.read().is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<RepositoryName> {
        let mut names: Vec<_> = self.factories.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn factory(&self, name: &str) -> UnitOfWorkResult<RepositoryFactory<H>> {
        self.factories
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| UnitOfWorkError::RepositoryNotRegistered(name.into()))
    }
}

impl<H> Clone for RepositoryRegistry<H> {
    fn clone(&self) -> Self {
        Self {
            factories: Arc::clone(&self.factories),
        }
    }
}

impl<H: 'static> Default for RepositoryRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: 'static> fmt::Debug for RepositoryRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryRegistry")
            .field("names", &self.names())
            .finish()
    }
}
