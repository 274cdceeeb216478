use std::sync::Arc;

use stacker_model::{ModelRegistry, Patcher};
use stacker_store::{InMemoryObjectStore, ObjectStore};
use stacker_types::{Entity, EntityId};

use crate::error::{CoreError, CoreResult};
use crate::locks::OwnerLocks;

/// The Stacker service: store, registry and owner locks, constructed once and
/// shared (behind an `Arc`) by every request handler.
pub struct Stacker {
    pub(crate) store: Arc<dyn ObjectStore>,
    pub(crate) patcher: Patcher,
    pub(crate) locks: OwnerLocks,
}

impl Stacker {
    pub fn new(store: Arc<dyn ObjectStore>, registry: Arc<ModelRegistry>) -> Self {
        Self {
            store,
            patcher: Patcher::new(registry),
            locks: OwnerLocks::new(),
        }
    }

    /// A service over a fresh in-memory store with the standard registry.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryObjectStore::new()),
            Arc::new(ModelRegistry::standard()),
        )
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    pub fn registry(&self) -> &ModelRegistry {
        self.patcher.registry()
    }
}

impl std::fmt::Debug for Stacker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stacker")
            .field("kinds", &self.registry().kinds().collect::<Vec<_>>())
            .field("active_owner_scopes", &self.locks.active())
            .finish()
    }
}

/// The id of an entity the store has just saved.
pub(crate) fn saved_id<E: Entity>(entity: &E) -> CoreResult<EntityId> {
    entity
        .id()
        .cloned()
        .ok_or_else(|| CoreError::Internal(format!("store returned a {} without an id", E::KIND)))
}
