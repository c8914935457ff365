//! This module defines and re-exports the interfaces for the ownership repository.
mod ownership;

pub use ownership::{OwnershipRepository, OwnershipTransaction};
