//! Error types for msform-api
//!
//! Every error leaves the service as `{ "message": string }`. Storage faults
//! are logged in full and reported to the client with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::service::ServiceError;
use crate::validation::ValidationError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or out-of-bounds submission field (400)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Request could not be read (400) - malformed JSON, broken multipart
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Body is neither JSON nor multipart (415)
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Storage fault (500)
    #[error("Storage error: {0}")]
    Storage(#[from] msform_common::Error),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(e) => ApiError::Validation(e),
            ServiceError::Storage(e) => ApiError::Storage(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found".to_string()),
            ApiError::UnsupportedMediaType(msg) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg),
            ApiError::Storage(err) => {
                tracing::error!(error = %err, "Storage fault while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
