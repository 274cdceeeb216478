use stacker_types::{Entity, EntityId, EntityKind};

use crate::error::{StoreError, StoreResult};

/// A stored snapshot: kind tag + id + serialized JSON.
///
/// `StoredEntity` is the unit of storage. Backends move these around without
/// looking inside `data`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredEntity {
    pub kind: EntityKind,
    pub id: EntityId,
    pub data: Vec<u8>,
}

impl StoredEntity {
    pub fn new(kind: EntityKind, id: EntityId, data: Vec<u8>) -> Self {
        Self { kind, id, data }
    }

    /// Serialize a saved entity.
    pub fn encode<E: Entity>(entity: &E) -> StoreResult<Self> {
        let id = entity.id().cloned().ok_or(StoreError::MissingId(E::KIND))?;
        let data =
            serde_json::to_vec(entity).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Self::new(E::KIND, id, data))
    }

    /// Decode into a typed entity.
    ///
    /// The key is authoritative for the id: a snapshot whose embedded id
    /// disagrees with its key is reported as corrupt.
    pub fn decode<E: Entity>(&self) -> StoreResult<E> {
        if self.kind != E::KIND {
            return Err(self.corrupt(format!("expected {}, got {}", E::KIND, self.kind)));
        }
        let mut entity: E =
            serde_json::from_slice(&self.data).map_err(|e| self.corrupt(e.to_string()))?;
        match entity.id() {
            Some(embedded) if embedded != &self.id => {
                return Err(self.corrupt(format!("embedded id {embedded} does not match key")));
            }
            Some(_) => {}
            None => entity.assign_id(self.id.clone()),
        }
        Ok(entity)
    }

    fn corrupt(&self, reason: String) -> StoreError {
        StoreError::CorruptObject {
            kind: self.kind,
            id: self.id.clone(),
            reason,
        }
    }
}
