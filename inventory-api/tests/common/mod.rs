//! Shared fixtures for the integration tests: the in-memory stores wrapped
//! in fakes that can be told to fail or hang.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Utc};
use inventory_api::server::{create_app, state::AppState};
use inventory_api::{AggregationEngine, AssetCache, AssetCoordinator, CacheSettings, Stores};
use inventory_cache::{CacheError, CacheStore, MemoryCacheStore};
use inventory_document_repository::{
    AssetDocumentStore, DocumentStoreError, GroupBucket, InMemoryAssetStore, MonthBucket,
    SummaryBuckets,
};
use inventory_ownership_repository::{
    InMemoryOwnershipRepository, OwnershipRepository, OwnershipRepositoryError,
    OwnershipTransaction,
};
use inventory_shared::{AssetDetail, AssetId, AssetPatch, CompanyId, GroupField, UserId};

pub const ACME: CompanyId = CompanyId(1);
pub const GLOBEX: CompanyId = CompanyId(2);

// Ownership store that can refuse to commit or to resolve companies
pub struct FlakyOwnership {
    pub inner: InMemoryOwnershipRepository,
    pub fail_company_of: AtomicBool,
    pub fail_commit: AtomicBool,
    pub rollbacks: Arc<AtomicUsize>,
}

impl FlakyOwnership {
    pub fn rollback_count(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }
}

struct FlakyTransaction {
    inner: Box<dyn OwnershipTransaction>,
    fail_commit: bool,
    rollbacks: Arc<AtomicUsize>,
}

#[async_trait]
impl OwnershipRepository for FlakyOwnership {
    async fn find_user_id(
        &self,
        username: &str,
        company_id: CompanyId,
    ) -> Result<Option<UserId>, OwnershipRepositoryError> {
        self.inner.find_user_id(username, company_id).await
    }

    async fn company_of(
        &self,
        asset_id: AssetId,
    ) -> Result<Option<CompanyId>, OwnershipRepositoryError> {
        if self.fail_company_of.load(Ordering::SeqCst) {
            return Err(OwnershipRepositoryError::unavailable("mock company lookup failure"));
        }
        self.inner.company_of(asset_id).await
    }

    async fn asset_ids_for_company(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<AssetId>, OwnershipRepositoryError> {
        self.inner.asset_ids_for_company(company_id).await
    }

    async fn begin(&self) -> Result<Box<dyn OwnershipTransaction>, OwnershipRepositoryError> {
        Ok(Box::new(FlakyTransaction {
            inner: self.inner.begin().await?,
            fail_commit: self.fail_commit.load(Ordering::SeqCst),
            rollbacks: Arc::clone(&self.rollbacks),
        }))
    }
}

#[async_trait]
impl OwnershipTransaction for FlakyTransaction {
    async fn insert_identity(
        &mut self,
        owner_user_id: UserId,
        company_id: CompanyId,
    ) -> Result<AssetId, OwnershipRepositoryError> {
        self.inner.insert_identity(owner_user_id, company_id).await
    }

    async fn delete_identity(&mut self, asset_id: AssetId) -> Result<u64, OwnershipRepositoryError> {
        self.inner.delete_identity(asset_id).await
    }

    async fn commit(&mut self) -> Result<(), OwnershipRepositoryError> {
        if self.fail_commit {
            return Err(OwnershipRepositoryError::unavailable("mock commit failure"));
        }
        self.inner.commit().await
    }

    async fn rollback(&mut self) -> Result<(), OwnershipRepositoryError> {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        self.inner.rollback().await
    }
}

// Document store that can fail or hang on writes and counts grouping queries
pub struct FlakyDocumentStore {
    pub inner: InMemoryAssetStore,
    pub fail_insert: AtomicBool,
    pub hang_insert: AtomicBool,
    /// Apply the insert, then never acknowledge it.
    pub hang_after_insert: AtomicBool,
    pub fail_delete: AtomicBool,
    pub aggregation_queries: AtomicUsize,
}

impl FlakyDocumentStore {
    pub fn aggregation_query_count(&self) -> usize {
        self.aggregation_queries.load(Ordering::SeqCst)
    }

    fn record_query(&self) {
        self.aggregation_queries.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AssetDocumentStore for FlakyDocumentStore {
    async fn ensure_index_exists(&self) -> Result<(), DocumentStoreError> {
        Ok(())
    }

    async fn insert_asset(&self, asset: &AssetDetail) -> Result<(), DocumentStoreError> {
        if self.hang_insert.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(DocumentStoreError::insert("mock insert failure"));
        }
        self.inner.insert_asset(asset).await?;
        if self.hang_after_insert.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn get_asset(&self, asset_id: AssetId) -> Result<Option<AssetDetail>, DocumentStoreError> {
        self.inner.get_asset(asset_id).await
    }

    async fn get_assets(&self, asset_ids: &[AssetId]) -> Result<Vec<AssetDetail>, DocumentStoreError> {
        self.inner.get_assets(asset_ids).await
    }

    async fn update_asset(
        &self,
        asset_id: AssetId,
        patch: &AssetPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, DocumentStoreError> {
        self.inner.update_asset(asset_id, patch, updated_at).await
    }

    async fn delete_asset(&self, asset_id: AssetId) -> Result<bool, DocumentStoreError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(DocumentStoreError::delete("mock delete failure"));
        }
        self.inner.delete_asset(asset_id).await
    }

    async fn count_by(
        &self,
        asset_ids: &[AssetId],
        field: GroupField,
    ) -> Result<Vec<GroupBucket>, DocumentStoreError> {
        self.record_query();
        self.inner.count_by(asset_ids, field).await
    }

    async fn count_by_month(&self, asset_ids: &[AssetId]) -> Result<Vec<MonthBucket>, DocumentStoreError> {
        self.record_query();
        self.inner.count_by_month(asset_ids).await
    }

    async fn summarize(&self, asset_ids: &[AssetId]) -> Result<SummaryBuckets, DocumentStoreError> {
        self.record_query();
        self.inner.summarize(asset_ids).await
    }
}

// Cache backend that is always down
pub struct BrokenCache;

#[async_trait]
impl CacheStore for BrokenCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::backend("mock cache outage"))
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::backend("mock cache outage"))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::backend("mock cache outage"))
    }

    async fn delete_prefix(&self, _prefix: &str) -> Result<u64, CacheError> {
        Err(CacheError::backend("mock cache outage"))
    }
}

/// Stores, fakes and the users `jdoe` (ACME) and `asmith` (GLOBEX).
pub struct Harness {
    pub ownership: Arc<FlakyOwnership>,
    pub documents: Arc<FlakyDocumentStore>,
    pub cache: Arc<dyn CacheStore>,
    pub stores: Stores,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with(Arc::new(MemoryCacheStore::new(1_000)), Duration::from_secs(1)).await
    }

    pub async fn with(cache: Arc<dyn CacheStore>, store_timeout: Duration) -> Self {
        let repository = InMemoryOwnershipRepository::new();
        repository.add_user("jdoe", ACME).await;
        repository.add_user("asmith", GLOBEX).await;

        let ownership = Arc::new(FlakyOwnership {
            inner: repository,
            fail_company_of: AtomicBool::new(false),
            fail_commit: AtomicBool::new(false),
            rollbacks: Arc::new(AtomicUsize::new(0)),
        });
        let documents = Arc::new(FlakyDocumentStore {
            inner: InMemoryAssetStore::new(),
            fail_insert: AtomicBool::new(false),
            hang_insert: AtomicBool::new(false),
            hang_after_insert: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            aggregation_queries: AtomicUsize::new(0),
        });

        let stores = Stores::new(
            ownership.clone(),
            documents.clone(),
            AssetCache::new(cache.clone(), CacheSettings::default()),
            store_timeout,
        );

        Self {
            ownership,
            documents,
            cache,
            stores,
        }
    }

    pub fn coordinator(&self) -> AssetCoordinator {
        AssetCoordinator::new(self.stores.clone())
    }

    pub fn engine(&self) -> AggregationEngine {
        AggregationEngine::new(self.stores.clone())
    }

    pub fn app(&self) -> Router {
        create_app(AppState::new(self.stores.clone()))
    }

    pub async fn identity_count(&self) -> usize {
        self.ownership.inner.identity_count().await
    }

    pub async fn document_count(&self) -> usize {
        self.documents.inner.document_count().await
    }

    pub async fn cached(&self, key: &str) -> Option<String> {
        self.cache.get(key).await.ok().flatten()
    }
}
