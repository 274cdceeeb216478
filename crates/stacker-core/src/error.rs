use stacker_model::ModelError;
use stacker_store::StoreError;
use stacker_types::{EntityId, EntityKind};
use thiserror::Error;

/// Every failure the core reports to its callers.
///
/// Only [`CoreError::StoreUnavailable`] is worth retrying; everything else is
/// permanent for the given input.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: EntityId },

    #[error("owner not found: {0}")]
    OwnerNotFound(EntityId),

    #[error("user {owner} still owns {count} task(s)")]
    OwnerHasItems { owner: EntityId, count: usize },

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("field {0} does not accept multiple values")]
    MultiValueNotAllowed(String),

    #[error("type mismatch for field {field}: {reason}")]
    TypeMismatch { field: String, reason: String },

    #[error("patch contains no updatable fields")]
    EmptyPatch,

    #[error("user {owner} references missing task {missing}")]
    InconsistentIndex { owner: EntityId, missing: EntityId },

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("unknown entity kind: {0}")]
    UnknownKind(String),

    #[error("corrupt {kind} snapshot {id}: {reason}")]
    CorruptSnapshot {
        kind: EntityKind,
        id: EntityId,
        reason: String,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::OwnerNotFound(_) => "owner_not_found",
            Self::OwnerHasItems { .. } => "owner_has_items",
            Self::UnknownField(_) => "unknown_field",
            Self::MultiValueNotAllowed(_) => "multi_value_not_allowed",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::EmptyPatch => "empty_patch",
            Self::InconsistentIndex { .. } => "inconsistent_index",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::UnknownKind(_) => "unknown_kind",
            Self::CorruptSnapshot { .. } => "corrupt_snapshot",
            Self::Internal(_) => "internal",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<StoreError> for CoreError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { kind, id } => Self::NotFound { kind, id },
            StoreError::Unavailable(msg) => Self::StoreUnavailable(msg),
            StoreError::Io(e) => Self::StoreUnavailable(e.to_string()),
            StoreError::CorruptObject { kind, id, reason } => {
                Self::CorruptSnapshot { kind, id, reason }
            }
            e @ (StoreError::Serialization(_) | StoreError::MissingId(_)) => {
                Self::Internal(e.to_string())
            }
        }
    }
}

impl From<ModelError> for CoreError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::UnknownField(f) => Self::UnknownField(f),
            ModelError::MultiValueNotAllowed(f) => Self::MultiValueNotAllowed(f),
            ModelError::TypeMismatch { field, reason } => Self::TypeMismatch { field, reason },
            ModelError::EmptyPatch => Self::EmptyPatch,
            ModelError::UnknownKind(k) => Self::UnknownKind(k),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_store_unavailable_is_retryable() {
        assert!(CoreError::StoreUnavailable("down".into()).is_retryable());
        assert!(!CoreError::EmptyPatch.is_retryable());
        assert!(!CoreError::OwnerNotFound(EntityId::parse("U1").unwrap()).is_retryable());
    }

    #[test]
    fn store_errors_map_onto_taxonomy() {
        let id = EntityId::parse("T1").unwrap();
        let e: CoreError = StoreError::NotFound {
            kind: EntityKind::Task,
            id: id.clone(),
        }
        .into();
        assert_eq!(e.code(), "not_found");

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let e: CoreError = StoreError::Io(io).into();
        assert!(e.is_retryable());

        let e: CoreError = StoreError::CorruptObject {
            kind: EntityKind::Task,
            id,
            reason: "bad json".into(),
        }
        .into();
        assert_eq!(e.code(), "corrupt_snapshot");
    }

    #[test]
    fn model_errors_keep_field_names() {
        let e: CoreError = ModelError::UnknownField("colour".into()).into();
        assert_eq!(e.to_string(), "unknown field: colour");
        let e: CoreError = ModelError::EmptyPatch.into();
        assert_eq!(e.code(), "empty_patch");
    }
}
