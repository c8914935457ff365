//! Document store error types.

use thiserror::Error;

/// Unified errors from document store operations.
#[derive(Debug, Clone, Error)]
pub enum DocumentStoreError {
    /// Failed to establish connection to the backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Failed to create the index or its alias.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// A document with the same asset id already exists.
    #[error("Document already exists: asset_id={0}")]
    Conflict(i64),

    /// Failed to insert a document.
    #[error("Insert error: {0}")]
    InsertError(String),

    /// Failed to read one or more documents.
    #[error("Read error: {0}")]
    ReadError(String),

    /// Failed to update a document.
    #[error("Update error: {0}")]
    UpdateError(String),

    /// Failed to delete a document.
    #[error("Delete error: {0}")]
    DeleteError(String),

    /// Failed to run an aggregation query.
    #[error("Query error: {0}")]
    QueryError(String),

    /// Failed to parse a response from the backend.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize data for the backend.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DocumentStoreError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create an insert error.
    pub fn insert(msg: impl Into<String>) -> Self {
        Self::InsertError(msg.into())
    }

    /// Create a read error.
    pub fn read(msg: impl Into<String>) -> Self {
        Self::ReadError(msg.into())
    }

    /// Create an update error.
    pub fn update(msg: impl Into<String>) -> Self {
        Self::UpdateError(msg.into())
    }

    /// Create a delete error.
    pub fn delete(msg: impl Into<String>) -> Self {
        Self::DeleteError(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }
}
