use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use stacker_types::{EntityId, EntityKind};

use crate::error::{StoreError, StoreResult};
use crate::object::StoredEntity;
use crate::traits::ObjectStore;

type Namespaces = HashMap<EntityKind, BTreeMap<EntityId, StoredEntity>>;

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. All snapshots are held behind a `RwLock`
/// for safe concurrent access and are cloned on read/write.
///
/// The store can simulate an unreachable backend: [`set_offline`] fails every
/// call, and [`fail_writes_after`] lets a fixed number of writes through
/// before failing the rest. Both surface as [`StoreError::Unavailable`].
///
/// [`set_offline`]: InMemoryObjectStore::set_offline
/// [`fail_writes_after`]: InMemoryObjectStore::fail_writes_after
pub struct InMemoryObjectStore {
    objects: RwLock<Namespaces>,
    offline: AtomicBool,
    write_budget: Mutex<Option<usize>>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            offline: AtomicBool::new(false),
            write_budget: Mutex::new(None),
        }
    }

    /// Number of snapshots currently stored, across all kinds.
    pub fn len(&self) -> usize {
        let map = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        map.values().map(BTreeMap::len).sum()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all snapshots.
    pub fn clear(&self) {
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Allow `n` more writes, then fail every write. `None` lifts the limit.
    pub fn fail_writes_after(&self, n: Option<usize>) {
        *self.write_budget.lock().unwrap_or_else(PoisonError::into_inner) = n;
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store is offline".into()));
        }
        Ok(())
    }

    fn take_write_permit(&self) -> StoreResult<()> {
        let mut budget = self.write_budget.lock().map_err(poisoned)?;
        match budget.as_mut() {
            Some(0) => Err(StoreError::Unavailable("write budget exhausted".into())),
            Some(n) => {
                *n -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Unavailable(format!("lock poisoned: {e}"))
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, kind: EntityKind, id: &EntityId) -> StoreResult<Option<StoredEntity>> {
        self.check_online()?;
        let map = self.objects.read().map_err(poisoned)?;
        Ok(map.get(&kind).and_then(|ns| ns.get(id)).cloned())
    }

    fn write(&self, object: &StoredEntity) -> StoreResult<()> {
        self.check_online()?;
        self.take_write_permit()?;
        let mut map = self.objects.write().map_err(poisoned)?;
        map.entry(object.kind)
            .or_default()
            .insert(object.id.clone(), object.clone());
        Ok(())
    }

    fn delete(&self, kind: EntityKind, id: &EntityId) -> StoreResult<bool> {
        self.check_online()?;
        let mut map = self.objects.write().map_err(poisoned)?;
        Ok(map
            .get_mut(&kind)
            .map(|ns| ns.remove(id).is_some())
            .unwrap_or(false))
    }

    fn list(&self, kind: EntityKind) -> StoreResult<Vec<StoredEntity>> {
        self.check_online()?;
        let map = self.objects.read().map_err(poisoned)?;
        Ok(map
            .get(&kind)
            .map(|ns| ns.values().cloned().collect())
            .unwrap_or_default())
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &self.len())
            .field("offline", &self.offline.load(Ordering::SeqCst))
            .finish()
    }
}
