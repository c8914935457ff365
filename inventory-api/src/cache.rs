//! Best-effort cache helpers.
//!
//! Every method here swallows cache failures: errors and timeouts are logged
//! at `warn` and reported as a miss (for reads) or ignored (for writes and
//! invalidations). A cache outage therefore costs latency, never correctness.
//!
//! Key layout:
//!
//! - `asset:{asset_id}` holds a serialized [`AssetDetail`]
//! - `agg:{company_id}:{kind}` holds a serialized aggregation result

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use inventory_cache::{CacheError, CacheStore, NoopCacheStore};
use inventory_shared::{AggregationKind, AssetDetail, AssetId, CompanyId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

const ASSET_NAMESPACE: &str = "asset:";
const AGGREGATION_NAMESPACE: &str = "agg:";

/// Default TTL of per-asset entries.
pub const DEFAULT_ASSET_TTL: Duration = Duration::from_secs(300);

/// Default TTL of aggregation entries.
pub const DEFAULT_AGGREGATION_TTL: Duration = Duration::from_secs(60);

/// Default deadline of a single cache call.
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_millis(500);

/// Expiry and deadline settings for the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub asset_ttl: Duration,
    pub aggregation_ttl: Duration,
    pub timeout: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            asset_ttl: DEFAULT_ASSET_TTL,
            aggregation_ttl: DEFAULT_AGGREGATION_TTL,
            timeout: DEFAULT_CACHE_TIMEOUT,
        }
    }
}

pub fn asset_key(asset_id: AssetId) -> String {
    format!("{}{}", ASSET_NAMESPACE, asset_id)
}

pub fn aggregation_key(company_id: CompanyId, kind: AggregationKind) -> String {
    format!("{}{}:{}", AGGREGATION_NAMESPACE, company_id, kind)
}

fn company_aggregation_prefix(company_id: CompanyId) -> String {
    format!("{}{}:", AGGREGATION_NAMESPACE, company_id)
}

/// Failure-absorbing view of a [`CacheStore`].
#[derive(Clone)]
pub struct AssetCache {
    store: Arc<dyn CacheStore>,
    settings: CacheSettings,
}

impl AssetCache {
    pub fn new(store: Arc<dyn CacheStore>, settings: CacheSettings) -> Self {
        Self { store, settings }
    }

    /// A cache that never hits.
    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopCacheStore), CacheSettings::default())
    }

    pub fn settings(&self) -> CacheSettings {
        self.settings
    }

    async fn absorb<T, F>(&self, operation: &'static str, key: &str, call: F) -> Option<T>
    where
        F: Future<Output = Result<T, CacheError>>,
    {
        match tokio::time::timeout(self.settings.timeout, call).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!(operation, key = %key, error = %e, "Cache operation failed");
                None
            }
            Err(_) => {
                warn!(operation, key = %key, "Cache operation timed out");
                None
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let store = &self.store;
        let value = self
            .absorb("get", key, async move {
                let value = match store.get(key).await? {
                    Some(raw) => Some(serde_json::from_str::<T>(&raw)?),
                    None => None,
                };
                Ok::<_, CacheError>(value)
            })
            .await
            .flatten();

        debug!(key = %key, hit = value.is_some(), "Cache lookup");
        value
    }

    async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let store = &self.store;
        self.absorb("set", key, async move {
            let raw = serde_json::to_string(value)?;
            store.set(key, raw, ttl).await
        })
        .await;
    }

    async fn delete(&self, key: &str) {
        self.absorb("delete", key, self.store.delete(key)).await;
    }

    async fn delete_prefix(&self, prefix: &str) {
        if let Some(removed) = self
            .absorb("delete_prefix", prefix, self.store.delete_prefix(prefix))
            .await
        {
            debug!(prefix = %prefix, removed, "Invalidated cache entries");
        }
    }

    pub async fn get_asset(&self, asset_id: AssetId) -> Option<AssetDetail> {
        self.get_json(&asset_key(asset_id)).await
    }

    pub async fn put_asset(&self, asset: &AssetDetail) {
        self.set_json(&asset_key(asset.asset_id), asset, self.settings.asset_ttl)
            .await;
    }

    pub async fn invalidate_asset(&self, asset_id: AssetId) {
        self.delete(&asset_key(asset_id)).await;
    }

    /// Read a cached aggregation result, decoded as `T`.
    pub async fn get_aggregation<T: DeserializeOwned>(
        &self,
        company_id: CompanyId,
        kind: AggregationKind,
    ) -> Option<T> {
        self.get_json(&aggregation_key(company_id, kind)).await
    }

    pub async fn put_aggregation<T: Serialize>(
        &self,
        company_id: CompanyId,
        kind: AggregationKind,
        value: &T,
    ) {
        self.set_json(
            &aggregation_key(company_id, kind),
            value,
            self.settings.aggregation_ttl,
        )
        .await;
    }

    /// Drop every cached aggregation of one company.
    pub async fn invalidate_company_aggregations(&self, company_id: CompanyId) {
        self.delete_prefix(&company_aggregation_prefix(company_id))
            .await;
    }

    /// Drop every cached aggregation of every company.
    pub async fn invalidate_all_aggregations(&self) {
        self.delete_prefix(AGGREGATION_NAMESPACE).await;
    }
}
