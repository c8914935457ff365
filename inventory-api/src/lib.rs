//! # Inventory API
//!
//! Asset inventory service. A single logical asset lives in two stores: the
//! relational ownership store issues its id and records the owning company,
//! and the document store holds its descriptive detail record. A best-effort
//! cache sits in front of reads and aggregations.
//!
//! ## Architecture
//!
//! 1. **Coordinator**: sequences create/read/update/delete across both stores
//!    with compensating rollbacks, and invalidates the cache
//! 2. **Aggregation engine**: grouped counts over a company's assets
//! 3. **Cache**: failure-absorbing wrapper over a [`inventory_cache::CacheStore`]
//! 4. **Server**: the HTTP surface
//!
//! ## Modules
//!
//! - [`config`]: Configuration and dependency initialization
//! - [`context`]: The store handles shared by every operation
//! - [`coordinator`]: Cross-store CRUD
//! - [`aggregation`]: Grouped statistics
//! - [`cache`]: Best-effort cache helpers
//! - [`listing`]: Filtering and sorting of asset lists
//! - [`server`]: HTTP routing and handlers
//! - [`errors`]: Error types

pub mod aggregation;
pub mod cache;
pub mod config;
pub mod context;
pub mod coordinator;
pub mod errors;
pub mod listing;
pub mod server;

pub use aggregation::AggregationEngine;
pub use cache::{AssetCache, CacheSettings};
pub use config::{AppConfig, Dependencies};
pub use context::Stores;
pub use coordinator::AssetCoordinator;
pub use errors::{AssetError, StartupError};
