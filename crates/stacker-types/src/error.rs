use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid entity id {id:?}: {reason}")]
    InvalidId { id: String, reason: &'static str },

    #[error("unknown entity kind: {0}")]
    UnknownKind(String),
}
