//! HTTP mapping of conversion errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::services::ProcessError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Build a JSON error response.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

impl IntoResponse for ProcessError {
    fn into_response(self) -> Response {
        match &self {
            ProcessError::TooLarge(_) => {
                json_error(StatusCode::PAYLOAD_TOO_LARGE, self.to_string())
            }
            e if e.is_client_error() => {
                tracing::info!("Rejected upload: {}", e);
                json_error(StatusCode::BAD_REQUEST, e.to_string())
            }
            e => {
                tracing::error!("Processing failed: {}", e);
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Processing failed. Please try again or use a different file.",
                )
            }
        }
    }
}
