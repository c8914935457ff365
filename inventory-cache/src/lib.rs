//! Key/value cache backends for the asset inventory.
//!
//! The cache is never a source of truth: values are JSON strings with a
//! per-entry TTL, and callers are expected to treat every error as a miss.
//!
//! ## Usage
//!
//! ```ignore
//! use inventory_cache::CacheSource;
//!
//! // Caching switched off
//! let cache = CacheSource::disabled().into_store();
//!
//! // Bounded in-process cache
//! let cache = CacheSource::memory(10_000).into_store();
//! ```

mod memory;
mod noop;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryCacheStore;
pub use noop::NoopCacheStore;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Trait for cache storage backends.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get the value stored under `key`, `None` on a miss or an expired entry.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`, replacing any previous entry.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Remove every key starting with `prefix` and return how many were removed.
    async fn delete_prefix(&self, prefix: &str) -> Result<u64, CacheError>;
}

/// Configuration for the cache backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheSource {
    /// Caching switched off; every read misses.
    Disabled,

    /// In-process cache holding at most `max_entries` entries.
    Memory { max_entries: usize },
}

impl CacheSource {
    pub fn disabled() -> Self {
        Self::Disabled
    }

    pub fn memory(max_entries: usize) -> Self {
        Self::Memory { max_entries }
    }

    /// Create the cache with the appropriate backend.
    pub fn into_store(self) -> Arc<dyn CacheStore> {
        match self {
            Self::Disabled => Arc::new(NoopCacheStore),
            Self::Memory { max_entries } => Arc::new(MemoryCacheStore::new(max_entries)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_source_never_hits() {
        let store = CacheSource::disabled().into_store();
        store.set("k", "v".to_string(), Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_source_stores_values() {
        let store = CacheSource::memory(4).into_store();
        store.set("k", "v".to_string(), Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
