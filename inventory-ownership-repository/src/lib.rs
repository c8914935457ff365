//! # Inventory Ownership Repository
//! This crate provides the relational half of the asset inventory: the
//! identity records that tie an asset id to its owning company and creating
//! user. It defines the repository and transaction interfaces, a PostgreSQL
//! implementation, and an in-memory implementation for development and tests.
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

pub use errors::OwnershipRepositoryError;
pub use interfaces::{OwnershipRepository, OwnershipTransaction};
pub use memory::InMemoryOwnershipRepository;
pub use postgres::PostgresOwnershipRepository;
