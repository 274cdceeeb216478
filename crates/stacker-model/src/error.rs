use thiserror::Error;

/// Rejections produced while validating a patch or resolving a schema.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The field does not exist or is not patchable.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A scalar field received more than one value.
    #[error("field {0} does not accept multiple values")]
    MultiValueNotAllowed(String),

    /// A raw value could not be coerced to the field's kind.
    #[error("type mismatch for field {field}: {reason}")]
    TypeMismatch { field: String, reason: String },

    /// Nothing to update once the immutable `id` key is removed.
    #[error("patch contains no updatable fields")]
    EmptyPatch,

    /// No schema is registered for this kind.
    #[error("unknown entity kind: {0}")]
    UnknownKind(String),
}

impl ModelError {
    pub(crate) fn mismatch(field: &str, reason: impl Into<String>) -> Self {
        Self::TypeMismatch {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
