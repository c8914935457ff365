//! Error types for the ownership repository.
mod ownership;

pub use ownership::OwnershipRepositoryError;
