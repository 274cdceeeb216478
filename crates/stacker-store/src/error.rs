use stacker_types::{EntityId, EntityKind};

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested entity was not found.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: EntityId },

    /// The backend cannot be reached or refused the call.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization of a snapshot failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A stored snapshot could not be decoded.
    #[error("corrupt {kind} snapshot {id}: {reason}")]
    CorruptObject {
        kind: EntityKind,
        id: EntityId,
        reason: String,
    },

    /// Attempted to encode an entity that has no id yet.
    #[error("cannot store {0} without an id")]
    MissingId(EntityKind),
}

impl StoreError {
    /// Whether retrying the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Io(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
