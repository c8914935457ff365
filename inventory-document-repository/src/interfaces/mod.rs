//! Interface definitions for the document store.
//!
//! This module defines the abstract `AssetDocumentStore` trait that allows
//! for dependency injection and swappable backend implementations.

mod asset_document_store;

pub use asset_document_store::AssetDocumentStore;
