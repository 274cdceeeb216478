use stacker_types::{EntityId, EntityKind};

use crate::error::StoreResult;
use crate::object::StoredEntity;

/// Key-value store of entity snapshots keyed by `(kind, id)`.
///
/// All implementations must satisfy these invariants:
/// - Each `read`, `write` and `delete` is atomic with respect to other calls on
///   the same key. Nothing spans more than one key.
/// - `write` overwrites any existing snapshot under the same key.
/// - `delete` of a missing key returns `Ok(false)`.
/// - `list` returns snapshots in ascending id order.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read a snapshot. Returns `Ok(None)` if it does not exist.
    fn read(&self, kind: EntityKind, id: &EntityId) -> StoreResult<Option<StoredEntity>>;

    /// Write (create or overwrite) a snapshot.
    fn write(&self, object: &StoredEntity) -> StoreResult<()>;

    /// Delete a snapshot. Returns `true` if it existed.
    fn delete(&self, kind: EntityKind, id: &EntityId) -> StoreResult<bool>;

    /// All snapshots of a kind, ascending by id.
    fn list(&self, kind: EntityKind) -> StoreResult<Vec<StoredEntity>>;

    /// Allocate a fresh id for a new entity of `kind`.
    ///
    /// The default is a UUID v7, unique without coordination. Backends with
    /// their own id sequences may override.
    fn generate_id(&self, _kind: EntityKind) -> EntityId {
        EntityId::generate()
    }

    /// Check whether a snapshot exists.
    fn exists(&self, kind: EntityKind, id: &EntityId) -> StoreResult<bool> {
        Ok(self.read(kind, id)?.is_some())
    }

    /// Read multiple snapshots, preserving input order.
    ///
    /// Default implementation calls `read()` for each id.
    fn read_batch(
        &self,
        kind: EntityKind,
        ids: &[EntityId],
    ) -> StoreResult<Vec<Option<StoredEntity>>> {
        ids.iter().map(|id| self.read(kind, id)).collect()
    }
}
