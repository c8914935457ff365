//! # Inventory Document Repository
//!
//! This crate provides the document half of the asset inventory: the store
//! that owns each asset's mutable detail record. It defines the store
//! interface, an OpenSearch implementation (including the grouping queries
//! used for analytics), and an in-memory implementation.

pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod opensearch;
pub mod types;

pub use errors::DocumentStoreError;
pub use interfaces::AssetDocumentStore;
pub use memory::InMemoryAssetStore;
pub use opensearch::OpenSearchAssetStore;
pub use types::{GroupBucket, MonthBucket, SummaryBuckets};
