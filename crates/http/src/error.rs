//! Error handling for the gateway HTTP layer

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use gateway_db::DbError;
use serde_json::json;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {message}")]
    NotFound { message: String, code: String },

    #[error("bad request: {message}")]
    BadRequest {
        details: Vec<serde_json::Value>,
        code: String,
        message: String,
    },

    /// A rejected request that also reports itself through alert headers.
    #[error("bad request: {message}")]
    BadRequestAlert {
        message: String,
        code: String,
        headers: HeaderMap,
    },

    #[error(transparent)]
    Storage(#[from] DbError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: "not_found".to_string(),
        }
    }

    /// Create a bad request error with structured details
    pub fn bad_request_with(details: Vec<serde_json::Value>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            details,
            code: "bad_request".to_string(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BadRequest { .. } | AppError::BadRequestAlert { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let timestamp = OffsetDateTime::now_utc().to_string();
        let status = self.status();

        let (error_code, message, details, headers) = match self {
            AppError::NotFound { message, code } => (code, message, Vec::new(), HeaderMap::new()),
            AppError::BadRequest {
                details,
                code,
                message,
            } => (code, message, details, HeaderMap::new()),
            AppError::BadRequestAlert {
                message,
                code,
                headers,
            } => (code, message, Vec::new(), headers),
            AppError::Storage(e) => (
                "storage_error".to_string(),
                e.to_string(),
                Vec::new(),
                HeaderMap::new(),
            ),
            AppError::Internal(e) => (
                "internal_error".to_string(),
                e.to_string(),
                Vec::new(),
                HeaderMap::new(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(
                error_id = %error_id,
                error_code = %error_code,
                status_code = %status.as_u16(),
                error = %message,
                "Request error"
            );
        } else {
            tracing::warn!(
                error_id = %error_id,
                error_code = %error_code,
                status_code = %status.as_u16(),
                "Request rejected"
            );
        }

        // Hide storage and internal details from clients in release builds
        let message = if cfg!(not(debug_assertions)) && status.is_server_error() {
            "An internal server error occurred".to_string()
        } else {
            message
        };

        let error_response = json!({
            "error": {
                "code": error_code,
                "message": message,
                "details": details,
                "trace_id": error_id.to_string(),
                "timestamp": timestamp
            }
        });

        (status, headers, Json(error_response)).into_response()
    }
}
