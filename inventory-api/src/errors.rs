//! Error types for the inventory service.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use inventory_document_repository::DocumentStoreError;
use inventory_ownership_repository::OwnershipRepositoryError;
use inventory_shared::ParseEnumError;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by asset operations.
///
/// Cache failures never appear here; they are absorbed by
/// [`AssetCache`](crate::cache::AssetCache).
#[derive(Error, Debug)]
pub enum AssetError {
    /// Malformed or missing input. Raised before any store is touched.
    #[error("{0}")]
    Validation(String),

    /// An asset or user lookup matched nothing.
    #[error("{0}")]
    NotFound(String),

    /// Driver, transport or timeout failure from either store.
    #[error("Store error: {0}")]
    Store(String),
}

impl AssetError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not-found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a store error.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create the store error for a call that exceeded its deadline.
    pub fn timeout(operation: &str, after: Duration) -> Self {
        Self::Store(format!(
            "{} timed out after {}ms",
            operation,
            after.as_millis()
        ))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<OwnershipRepositoryError> for AssetError {
    fn from(err: OwnershipRepositoryError) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<DocumentStoreError> for AssetError {
    fn from(err: DocumentStoreError) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<ParseEnumError> for AssetError {
    fn from(err: ParseEnumError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl IntoResponse for AssetError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Store(msg) => format!("Server error: {}", msg),
            other => other.to_string(),
        };
        (
            self.status_code(),
            Json(json!({ "success": false, "message": message })),
        )
            .into_response()
    }
}

/// Errors that stop the service from starting.
#[derive(Error, Debug)]
pub enum StartupError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A backing store could not be reached or initialized.
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

impl StartupError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }
}
