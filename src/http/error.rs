//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::services::ServiceError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request before it reaches a service
    BadRequest(String),
    /// Service-level failure
    Service(ServiceError),
    /// Internal server error
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("INTERNAL_ERROR", msg),
                )
            }
            AppError::Service(err) => match err {
                ServiceError::NotFound(msg) => {
                    (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg))
                }
                ServiceError::Forbidden(msg) => {
                    (StatusCode::FORBIDDEN, ApiError::new("FORBIDDEN", msg))
                }
                ServiceError::Unauthenticated => (
                    StatusCode::UNAUTHORIZED,
                    ApiError::new("UNAUTHENTICATED", "authentication required"),
                ),
                ServiceError::DuplicateEmail(email) => (
                    StatusCode::CONFLICT,
                    ApiError::new("DUPLICATE_EMAIL", format!("duplicate email: {}", email)),
                ),
                ServiceError::DuplicateNickname(nickname) => (
                    StatusCode::CONFLICT,
                    ApiError::new(
                        "DUPLICATE_NICKNAME",
                        format!("duplicate nickname: {}", nickname),
                    ),
                ),
                ServiceError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    ApiError::new("INVALID_CREDENTIALS", "invalid credentials"),
                ),
                ServiceError::Validation(msg) => (
                    StatusCode::BAD_REQUEST,
                    ApiError::new("VALIDATION_ERROR", msg),
                ),
                ServiceError::Storage(err) => {
                    tracing::error!("storage error: {}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiError::new("STORAGE_ERROR", err.to_string()),
                    )
                }
            },
        };

        (status, Json(error)).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        AppError::Service(err)
    }
}
