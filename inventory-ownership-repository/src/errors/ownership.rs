//! Errors raised while reading or writing identity records.
use thiserror::Error;

/// Represents errors that can occur within the ownership repository.
///
/// Driver failures are wrapped as-is; the remaining variants describe misuse
/// of a transaction handle.
#[derive(Debug, Error)]
pub enum OwnershipRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Transaction already finished")]
    TransactionClosed,

    #[error("Unavailable: {0}")]
    Unavailable(String),
}

impl OwnershipRepositoryError {
    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
