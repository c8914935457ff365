//! In-memory document store for development and testing.
//!
//! Aggregations are computed by scanning the stored records, counting only
//! the ids the caller passes in.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use inventory_shared::{AssetDetail, AssetId, AssetPatch, GroupField};
use tokio::sync::RwLock;

use crate::errors::DocumentStoreError;
use crate::interfaces::AssetDocumentStore;
use crate::types::{GroupBucket, MonthBucket, SummaryBuckets};

/// In-memory storage backend implementing [`AssetDocumentStore`].
///
/// Cloning shares the underlying state.
#[derive(Clone, Default)]
pub struct InMemoryAssetStore {
    documents: Arc<RwLock<BTreeMap<AssetId, AssetDetail>>>,
}

impl InMemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored detail records.
    pub async fn document_count(&self) -> usize {
        self.documents.read().await.len()
    }
}

fn selected<'a>(
    documents: &'a BTreeMap<AssetId, AssetDetail>,
    asset_ids: &'a [AssetId],
) -> impl Iterator<Item = &'a AssetDetail> {
    let wanted: HashSet<AssetId> = asset_ids.iter().copied().collect();
    documents
        .values()
        .filter(move |asset| wanted.contains(&asset.asset_id))
}

fn group<'a>(assets: impl Iterator<Item = &'a AssetDetail>, field: GroupField) -> Vec<GroupBucket> {
    let mut counts: HashMap<&'static str, u64> = HashMap::new();
    for asset in assets {
        if let Some(label) = field.label_of(asset) {
            *counts.entry(label).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .map(|(key, count)| GroupBucket::new(key, count))
        .collect()
}

#[async_trait]
impl AssetDocumentStore for InMemoryAssetStore {
    async fn ensure_index_exists(&self) -> Result<(), DocumentStoreError> {
        Ok(())
    }

    async fn insert_asset(&self, asset: &AssetDetail) -> Result<(), DocumentStoreError> {
        let mut documents = self.documents.write().await;
        if documents.contains_key(&asset.asset_id) {
            return Err(DocumentStoreError::Conflict(asset.asset_id.value()));
        }
        documents.insert(asset.asset_id, asset.clone());
        Ok(())
    }

    async fn get_asset(&self, asset_id: AssetId) -> Result<Option<AssetDetail>, DocumentStoreError> {
        Ok(self.documents.read().await.get(&asset_id).cloned())
    }

    async fn get_assets(&self, asset_ids: &[AssetId]) -> Result<Vec<AssetDetail>, DocumentStoreError> {
        let documents = self.documents.read().await;
        Ok(asset_ids
            .iter()
            .filter_map(|id| documents.get(id).cloned())
            .collect())
    }

    async fn update_asset(
        &self,
        asset_id: AssetId,
        patch: &AssetPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, DocumentStoreError> {
        let mut documents = self.documents.write().await;
        match documents.get_mut(&asset_id) {
            Some(asset) => {
                patch.apply(asset, updated_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_asset(&self, asset_id: AssetId) -> Result<bool, DocumentStoreError> {
        Ok(self.documents.write().await.remove(&asset_id).is_some())
    }

    async fn count_by(
        &self,
        asset_ids: &[AssetId],
        field: GroupField,
    ) -> Result<Vec<GroupBucket>, DocumentStoreError> {
        let documents = self.documents.read().await;
        Ok(group(selected(&documents, asset_ids), field))
    }

    async fn count_by_month(&self, asset_ids: &[AssetId]) -> Result<Vec<MonthBucket>, DocumentStoreError> {
        let documents = self.documents.read().await;
        let mut counts: BTreeMap<(i32, u32), u64> = BTreeMap::new();
        for asset in selected(&documents, asset_ids) {
            let created = asset.created_at;
            *counts.entry((created.year(), created.month())).or_insert(0) += 1;
        }
        Ok(counts
            .into_iter()
            .map(|((year, month), count)| MonthBucket { year, month, count })
            .collect())
    }

    async fn summarize(&self, asset_ids: &[AssetId]) -> Result<SummaryBuckets, DocumentStoreError> {
        let documents = self.documents.read().await;
        let assets: Vec<&AssetDetail> = selected(&documents, asset_ids).collect();

        Ok(SummaryBuckets {
            total: assets.len() as u64,
            high_or_critical: assets
                .iter()
                .filter(|asset| asset.value.is_some_and(|value| value.is_high_or_critical()))
                .count() as u64,
            by_type: group(assets.iter().copied(), GroupField::Type),
            by_status: group(assets.iter().copied(), GroupField::Status),
            by_value: group(assets.iter().copied(), GroupField::Value),
            by_classification: group(assets.iter().copied(), GroupField::Classification),
        })
    }
}
