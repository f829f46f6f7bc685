// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types and handling for the server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bim_showcase_viewer::{DimensionError, ViewerError};
use serde::Serialize;
use thiserror::Error;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("No model loaded")]
    NoModelLoaded,

    #[error("{0}")]
    Superseded(String),

    #[error("File too large: {size} bytes, maximum is {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(#[from] DimensionError),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ApiError::NoModelLoaded => (StatusCode::CONFLICT, "NO_MODEL_LOADED"),
            ApiError::Superseded(_) => (StatusCode::CONFLICT, "LOAD_SUPERSEDED"),
            ApiError::FileTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE"),
            ApiError::InvalidDimensions(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_DIMENSIONS"),
            ApiError::Processing(_) => (StatusCode::UNPROCESSABLE_ENTITY, "PROCESSING_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Join(_) => (StatusCode::INTERNAL_SERVER_ERROR, "TASK_ERROR"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, code, "Request failed");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ViewerError> for ApiError {
    fn from(err: ViewerError) -> Self {
        match err {
            ViewerError::NoModelLoaded => ApiError::NoModelLoaded,
            ViewerError::Superseded { .. } => ApiError::Superseded(err.to_string()),
            ViewerError::InvalidFileName(_) | ViewerError::NotDragging => {
                ApiError::BadRequest(err.to_string())
            }
            ViewerError::NotFound(_) | ViewerError::UnknownElement(_) => {
                ApiError::NotFound(err.to_string())
            }
            ViewerError::TooLarge { size, limit, .. } => ApiError::FileTooLarge { size, limit },
            ViewerError::Dimension(e) => ApiError::InvalidDimensions(e),
            ViewerError::NotUtf8(_) | ViewerError::Ifc(_) | ViewerError::Geometry(_) => {
                ApiError::Processing(err.to_string())
            }
            ViewerError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}
