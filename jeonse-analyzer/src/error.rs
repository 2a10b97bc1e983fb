//! Error types for jeonse-analyzer's HTTP surface

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::services::{AnalysisError, RegistryError};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Registry failure surfaced to the caller
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Analysis rejected its input
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Cache or database failure
    #[error("Storage error: {0}")]
    Common(#[from] jeonse_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Registry(ref err) => (
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_GATEWAY),
                "REGISTRY_ERROR",
                err.to_string(),
            ),
            ApiError::Analysis(ref err) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string()),
            ApiError::Common(jeonse_common::Error::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
            }
            ApiError::Common(ref err) => {
                error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    err.to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
