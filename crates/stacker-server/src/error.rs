use std::collections::BTreeMap;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use stacker_core::CoreError;
use stacker_types::TypeError;
use thiserror::Error;

use crate::envelope::JSendError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Boundary validation failed; maps field name to message.
    #[error("invalid input: {}", .0.keys().cloned().collect::<Vec<_>>().join(", "))]
    Validation(BTreeMap<String, String>),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Core(e) => match e {
                CoreError::NotFound { .. }
                | CoreError::OwnerNotFound(_)
                | CoreError::UnknownKind(_) => StatusCode::NOT_FOUND,
                CoreError::OwnerHasItems { .. } => StatusCode::CONFLICT,
                CoreError::UnknownField(_)
                | CoreError::MultiValueNotAllowed(_)
                | CoreError::TypeMismatch { .. }
                | CoreError::EmptyPatch => StatusCode::BAD_REQUEST,
                CoreError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                CoreError::InconsistentIndex { .. }
                | CoreError::CorruptSnapshot { .. }
                | CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Core(e) => e.code(),
            Self::Validation(_) => "validation_failed",
            Self::BadRequest(_) => "bad_request",
            // Same remedy as an unreachable store: retry later.
            Self::Timeout(_) => "store_unavailable",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.code(), error = %self, "request rejected");
        }
        let body = match self {
            Self::Validation(fields) => JSendError::fail(fields),
            other => JSendError::error(other.code(), other.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

/// Malformed path ids are the caller's fault.
impl From<TypeError> for ServerError {
    fn from(e: TypeError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use stacker_types::EntityId;

    #[test]
    fn core_errors_map_to_statuses() {
        let id = EntityId::parse("U1").unwrap();
        let cases = [
            (CoreError::OwnerNotFound(id.clone()), StatusCode::NOT_FOUND),
            (
                CoreError::OwnerHasItems { owner: id.clone(), count: 2 },
                StatusCode::CONFLICT,
            ),
            (CoreError::EmptyPatch, StatusCode::BAD_REQUEST),
            (
                CoreError::StoreUnavailable("down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                CoreError::InconsistentIndex { owner: id.clone(), missing: id },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ServerError::from(err).status(), status);
        }
    }

    #[test]
    fn timeout_reads_as_store_unavailable() {
        let e = ServerError::Timeout(Duration::from_secs(1));
        assert_eq!(e.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(e.code(), "store_unavailable");
    }

    #[test]
    fn validation_message_lists_fields() {
        let mut fields = BTreeMap::new();
        fields.insert("title".to_string(), "required".to_string());
        fields.insert("fullName".to_string(), "too long".to_string());
        assert_eq!(
            ServerError::Validation(fields).to_string(),
            "invalid input: fullName, title"
        );
    }
}
