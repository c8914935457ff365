use std::time::Duration;

use async_trait::async_trait;

use crate::{CacheError, CacheStore};

/// Cache backend that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCacheStore;

#[async_trait]
impl CacheStore for NoopCacheStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete_prefix(&self, _prefix: &str) -> Result<u64, CacheError> {
        Ok(0)
    }
}
