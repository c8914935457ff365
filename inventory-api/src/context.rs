//! Store handles shared by every operation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use inventory_document_repository::AssetDocumentStore;
use inventory_ownership_repository::OwnershipRepository;
use tracing::error;

use crate::cache::AssetCache;
use crate::errors::AssetError;

/// Explicitly constructed handles to the two stores and the cache.
///
/// Cloning is cheap; clones share the same connections.
#[derive(Clone)]
pub struct Stores {
    pub ownership: Arc<dyn OwnershipRepository>,
    pub documents: Arc<dyn AssetDocumentStore>,
    pub cache: AssetCache,
    /// Deadline applied to every individual store call.
    pub store_timeout: Duration,
}

impl Stores {
    pub fn new(
        ownership: Arc<dyn OwnershipRepository>,
        documents: Arc<dyn AssetDocumentStore>,
        cache: AssetCache,
        store_timeout: Duration,
    ) -> Self {
        Self {
            ownership,
            documents,
            cache,
            store_timeout,
        }
    }

    /// Run a store call under the store deadline.
    ///
    /// Failures and timeouts are logged and converted into [`AssetError::Store`].
    pub async fn bounded<T, E, F>(&self, operation: &'static str, call: F) -> Result<T, AssetError>
    where
        F: Future<Output = Result<T, E>>,
        AssetError: From<E>,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                let err = AssetError::from(e);
                error!(operation, error = %err, "Store call failed");
                Err(err)
            }
            Err(_) => {
                error!(
                    operation,
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "Store call timed out"
                );
                Err(AssetError::timeout(operation, self.store_timeout))
            }
        }
    }
}
