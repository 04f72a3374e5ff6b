//! Identity → provider table consulted when a back-end is activated.
//!
//! Availability is whatever the registered factory says it is: a factory
//! returning `None` (or no factory at all) means the back-end cannot be
//! activated right now. Providers can be added or removed while an
//! orchestrator is running; the next activation attempt sees the change.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::Backend;
use crate::models::BackendId;

/// Produces a handle for one back-end, or `None` when it is not usable.
pub type BackendFactory = Arc<dyn Fn() -> Option<Arc<dyn Backend>> + Send + Sync>;

#[derive(Default)]
pub struct BackendRegistry {
    providers: RwLock<HashMap<BackendId, BackendFactory>>,
}

impl BackendRegistry {
    /// Creates a registry with no providers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_provider<F>(self, backend: BackendId, factory: F) -> Self
    where
        F: Fn() -> Option<Arc<dyn Backend>> + Send + Sync + 'static,
    {
        self.register(backend, factory);
        self
    }

    /// Builder form of [`register_instance`](Self::register_instance).
    pub fn with_instance(self, backend: BackendId, handle: Arc<dyn Backend>) -> Self {
        self.register_instance(backend, handle);
        self
    }

    /// Install (or replace) the provider for `backend`.
    pub fn register<F>(&self, backend: BackendId, factory: F)
    where
        F: Fn() -> Option<Arc<dyn Backend>> + Send + Sync + 'static,
    {
        self.providers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(backend, Arc::new(factory));
    }

    /// Install an already constructed handle, always available.
    pub fn register_instance(&self, backend: BackendId, handle: Arc<dyn Backend>) {
        self.register(backend, move || Some(Arc::clone(&handle)));
    }

    /// Remove the provider for `backend`. Returns whether one was registered.
    pub fn unregister(&self, backend: BackendId) -> bool {
        self.providers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&backend)
            .is_some()
    }

    pub fn is_registered(&self, backend: BackendId) -> bool {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&backend)
    }

    /// Ask the provider for a handle. Never caches.
    pub fn probe(&self, backend: BackendId) -> Option<Arc<dyn Backend>> {
        // Clone the factory out so a slow provider does not hold the lock.
        let factory = self
            .providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&backend)
            .cloned()?;
        factory()
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        let mut registered: Vec<&BackendId> = providers.keys().collect();
        registered.sort();
        f.debug_struct("BackendRegistry")
            .field("registered", &registered)
            .finish()
    }
}
