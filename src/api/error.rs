use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    StorageFailure(String),

    #[error("{0}")]
    ProcessingFailure(String),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(#[from] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "invalid_request",
            AppError::PayloadTooLarge(_) => "payload_too_large",
            AppError::StorageFailure(_) => "storage_failure",
            AppError::ProcessingFailure(_) => "processing_failure",
            AppError::Unexpected(_) => "unexpected_failure",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::StorageFailure(_)
            | AppError::ProcessingFailure(_)
            | AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::InvalidRequest(msg) | AppError::PayloadTooLarge(msg) => {
                tracing::warn!("Rejected request: {}", msg);
            }
            AppError::StorageFailure(msg) => tracing::error!("Storage failure: {}", msg),
            AppError::ProcessingFailure(msg) => tracing::error!("Processing failure: {}", msg),
            AppError::Unexpected(e) => tracing::error!("Unexpected error: {:?}", e),
        }

        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}
