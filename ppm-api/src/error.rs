//! Error types for ppm-api
//!
//! Maps each layer's failures onto HTTP responses. Validation failures and
//! engine-rejected analyses are client-visible request outcomes; engine
//! process and protocol failures are server-side faults.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::engine::EngineError;
use crate::models::ValidationError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Malformed sample batch rejected before invocation (400)
    #[error("Invalid sample batch: {0}")]
    Validation(#[from] ValidationError),

    /// The engine ran and rejected the analysis (422); payload is its
    /// diagnostic text
    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    /// Engine process or protocol failure (500)
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ppm-common error
    #[error("Common error: {0}")]
    Common(#[from] ppm_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Validation(ref err) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                err.to_string(),
            ),
            ApiError::AnalysisFailed(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "ANALYSIS_FAILED", msg)
            }
            ApiError::Engine(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "ENGINE_ERROR",
                err.to_string(),
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg,
            ),
            ApiError::Io(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IO_ERROR",
                err.to_string(),
            ),
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
            ),
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
