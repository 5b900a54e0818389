//! API error handling
//!
//! Every `ClaimError` maps to one status code and a stable `error` code:
//!
//! | ClaimError            | Status | error                 |
//! |-----------------------|--------|-----------------------|
//! | Validation            | 422    | `validation_error`    |
//! | Precondition          | 409    | `precondition_failed` |
//! | Conflict              | 409    | `conflict`            |
//! | Forbidden             | 403    | `forbidden`           |
//! | NotFound              | 404    | `not_found`           |
//! | Dependency, retryable | 503    | `dependency_unavailable` |
//! | Dependency, other     | 502    | `dependency_failed`   |

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use domain_claims::ClaimError;

use crate::auth::AuthError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("Dependency failed: {0}")]
    DependencyFailed(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, field) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::PreconditionFailed(msg) => {
                (StatusCode::CONFLICT, "precondition_failed", msg, None)
            }
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Validation { field, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                message,
                Some(field),
            ),
            ApiError::DependencyUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "dependency_unavailable", msg, None)
            }
            ApiError::DependencyFailed(msg) => (StatusCode::BAD_GATEWAY, "dependency_failed", msg, None),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg, None)
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            field,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::Validation { field, message } => ApiError::Validation {
                field: field.to_string(),
                message,
            },
            ClaimError::Precondition(violation) => ApiError::PreconditionFailed(violation.to_string()),
            err @ ClaimError::Conflict { .. } => ApiError::Conflict(err.to_string()),
            ClaimError::Forbidden(msg) => ApiError::Forbidden(msg),
            err @ ClaimError::NotFound(_) => ApiError::NotFound(err.to_string()),
            err @ ClaimError::Dependency { retryable: true, .. } => {
                ApiError::DependencyUnavailable(err.to_string())
            }
            err @ ClaimError::Dependency { .. } => ApiError::DependencyFailed(err.to_string()),
            err @ ClaimError::InvariantViolated(_) => {
                error!(error = %err, "Claim invariant violated");
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingRole => ApiError::Forbidden(err.to_string()),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(format!("malformed multipart body: {}", err.body_text()))
    }
}
