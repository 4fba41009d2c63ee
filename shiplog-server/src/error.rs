//! HTTP-facing error type.
//!
//! Maps the core's error taxonomy onto response codes. Denials from the
//! limit gate are not errors in the core; the create handlers convert them
//! to [`ApiError::LimitExceeded`] so the reason string reaches the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use shiplog_core::CoreError;
use thiserror::Error;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No authenticated user identity on the request, or the identity does
    /// not match any profile.
    #[error("unauthorized")]
    Unauthenticated,

    /// Request input failed validation.
    #[error("{0}")]
    Validation(String),

    /// The resource already exists.
    #[error("{0}")]
    Conflict(String),

    /// A usage cap blocks the requested creation.
    #[error("{0}")]
    LimitExceeded(String),

    /// Webhook payload failed the signature check or could not be decoded.
    #[error("invalid signature")]
    InvalidSignature,

    /// Datastore or other backend failure.
    #[error("internal error")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Validation(_) | Self::InvalidSignature => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::LimitExceeded(_) => StatusCode::FORBIDDEN,
            Self::Internal(detail) => {
                tracing::error!(detail, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            // An unknown user is a session problem, never "free tier".
            CoreError::UnknownUser(_) => Self::Unauthenticated,
            CoreError::InvalidUserId(msg) | CoreError::InvalidEvent(msg) => Self::Validation(msg),
            CoreError::Storage(msg) => Self::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_user_maps_to_unauthorized() {
        let api: ApiError = CoreError::UnknownUser("u1".to_owned()).into();
        assert!(matches!(api, ApiError::Unauthenticated));
    }

    #[test]
    fn test_storage_maps_to_internal() {
        let api: ApiError = CoreError::Storage("down".to_owned()).into();
        assert!(matches!(api, ApiError::Internal(_)));
    }
}
