use crate::api::error::AppError;
use axum::response::{IntoResponse, Response};
use std::any::Any;

/// Turn a handler panic into the same JSON error body as every other failure
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    };

    AppError::Unexpected(anyhow::anyhow!(detail)).into_response()
}
