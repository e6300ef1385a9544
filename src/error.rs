//! # Error Handling Module
//!
//! Structured error types for the garage API. Every failure maps onto one
//! of three kinds the client understands: a rejected payload, a missing
//! record, or a store failure whose details stay in the server log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Result type alias for garage operations
pub type GarageResult<T> = Result<T, GarageError>;

/// Error type for all garage operations
#[derive(Error, Debug)]
pub enum GarageError {
    /// Missing or invalid required input
    #[error("{0}")]
    Validation(String),

    /// Record or route does not exist
    #[error("{0}")]
    NotFound(String),

    /// Underlying SQLite failure. `message` is what the client sees,
    /// `detail` is only logged.
    #[error("{message}: {detail}")]
    Store { message: String, detail: String },
}

impl GarageError {
    /// Builds a store error with the default client-facing message
    pub fn store(detail: impl Into<String>) -> Self {
        GarageError::Store {
            message: "Internal server error".to_string(),
            detail: detail.into(),
        }
    }

    /// Replaces the client-facing message of a store error.
    /// Validation and not-found errors pass through untouched.
    pub fn context(self, message: &str) -> Self {
        match self {
            GarageError::Store { detail, .. } => GarageError::Store {
                message: message.to_string(),
                detail,
            },
            other => other,
        }
    }

    /// Returns the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            GarageError::Validation(_) => StatusCode::BAD_REQUEST,
            GarageError::NotFound(_) => StatusCode::NOT_FOUND,
            GarageError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            GarageError::Validation(_) => "VALIDATION_ERROR",
            GarageError::NotFound(_) => "NOT_FOUND",
            GarageError::Store { .. } => "STORE_ERROR",
        }
    }

    /// The message safe to show to API consumers
    pub fn public_message(&self) -> &str {
        match self {
            GarageError::Validation(msg) | GarageError::NotFound(msg) => msg,
            GarageError::Store { message, .. } => message,
        }
    }
}

impl IntoResponse for GarageError {
    fn into_response(self) -> Response {
        if let GarageError::Store { message, detail } = &self {
            error!("{}: {}", message, detail);
        }

        let status = self.status_code();
        let body = Json(json!({
            "message": self.public_message(),
            "code": self.error_code(),
        }));

        (status, body).into_response()
    }
}

impl From<rusqlite::Error> for GarageError {
    fn from(err: rusqlite::Error) -> Self {
        GarageError::store(err.to_string())
    }
}

impl From<tokio_rusqlite::Error> for GarageError {
    fn from(err: tokio_rusqlite::Error) -> Self {
        GarageError::store(err.to_string())
    }
}
