use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::id::EntityId;
use crate::kind::EntityKind;

/// A persisted entity: a serializable snapshot with a store-assigned id.
///
/// `id()` is `None` until the object store saves the entity for the first
/// time. After that the id never changes.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The kind (and therefore store namespace) of this entity type.
    const KIND: EntityKind;

    /// The assigned id, if the entity has been saved.
    fn id(&self) -> Option<&EntityId>;

    /// Assign the id. Only object stores call this, and only once.
    fn assign_id(&mut self, id: EntityId);
}
