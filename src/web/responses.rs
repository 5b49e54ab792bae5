//! HTTP response types and error mapping
//!
//! Successful handlers return their body type directly. Errors go through
//! [`AppError`]'s `IntoResponse` impl so every endpoint reports failures
//! the same way.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

const GENERIC_INTERNAL_MESSAGE: &str = "Internal server error";

/// Body returned for every failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    /// Short human-readable message
    pub error: String,
    /// Request timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ErrorResponse {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            success: false,
            error: message.into(),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl AppError {
    /// HTTP status for this error kind
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidFormat { .. } => StatusCode::BAD_REQUEST,
            AppError::NotDecodable { .. } => StatusCode::NOT_FOUND,
            AppError::UpstreamUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Store(_)
            | AppError::Export { .. }
            | AppError::Io(_)
            | AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            match &self {
                AppError::UpstreamUnavailable { .. } => {
                    tracing::warn!("{}", self);
                    "Call to Vehicle API returned an error".to_string()
                }
                _ => {
                    tracing::error!("Request failed: {:?}", self);
                    GENERIC_INTERNAL_MESSAGE.to_string()
                }
            }
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
