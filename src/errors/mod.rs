//! Error handling module for the sync service.
//!
//! Maps failures to HTTP status codes and the fixed plain-text response bodies.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::reconciler::ReconcileError;

/// Response bodies as constants to avoid stringly-typed errors.
pub mod codes {
    pub const OK: &str = "OK";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Shared secret missing or wrong
    Unauthorized,
    /// Body is not a JSON array
    BadRequest(String),
    /// Directory call failed while syncing a record
    Directory(ReconcileError),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Directory(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => codes::UNAUTHORIZED,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
            AppError::Directory(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized => "missing or invalid secret".to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Directory(err) => err.to_string(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<ReconcileError> for AppError {
    fn from(err: ReconcileError) -> Self {
        tracing::error!("Directory error: {}", err);
        AppError::Directory(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::warn!("JSON error: {}", err);
        AppError::BadRequest(format!("JSON error: {}", err))
    }
}

/// Only the fixed code is sent back; details stay in the logs.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status_code(), self.error_code()).into_response()
    }
}
