//! Document store trait definition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inventory_shared::{AssetDetail, AssetId, AssetPatch, GroupField};

use crate::errors::DocumentStoreError;
use crate::types::{GroupBucket, MonthBucket, SummaryBuckets};

/// Abstracts the store holding asset detail records (OpenSearch, in-memory, ...).
///
/// Documents are keyed by `asset_id`, which is unique. Implementations must
/// make successful writes visible to subsequent reads and aggregations.
///
/// The grouping queries take the set of ids to consider; callers resolve
/// that set from the ownership store, so the document store never needs to
/// know about companies.
#[async_trait]
pub trait AssetDocumentStore: Send + Sync {
    /// Ensure the backing index (or collection) exists, creating it if necessary.
    ///
    /// Called once during application startup.
    async fn ensure_index_exists(&self) -> Result<(), DocumentStoreError>;

    /// Insert a new detail record.
    ///
    /// # Returns
    ///
    /// * `Err(DocumentStoreError::Conflict)` - If a record with the same id exists
    async fn insert_asset(&self, asset: &AssetDetail) -> Result<(), DocumentStoreError>;

    /// Fetch a detail record by id. A missing record is `Ok(None)`.
    async fn get_asset(&self, asset_id: AssetId) -> Result<Option<AssetDetail>, DocumentStoreError>;

    /// Fetch several detail records at once. Missing ids are omitted from the result.
    async fn get_assets(&self, asset_ids: &[AssetId]) -> Result<Vec<AssetDetail>, DocumentStoreError>;

    /// Apply a partial update and set `updated_at`.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - A record matched and was updated
    /// * `Ok(false)` - No record has this id
    async fn update_asset(
        &self,
        asset_id: AssetId,
        patch: &AssetPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, DocumentStoreError>;

    /// Delete a detail record.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - A record was deleted
    /// * `Ok(false)` - No record has this id
    async fn delete_asset(&self, asset_id: AssetId) -> Result<bool, DocumentStoreError>;

    /// Count the records among `asset_ids` per value of `field`.
    ///
    /// Records without a value for `field` are not counted.
    async fn count_by(
        &self,
        asset_ids: &[AssetId],
        field: GroupField,
    ) -> Result<Vec<GroupBucket>, DocumentStoreError>;

    /// Count the records among `asset_ids` per month of `created_at`.
    async fn count_by_month(&self, asset_ids: &[AssetId]) -> Result<Vec<MonthBucket>, DocumentStoreError>;

    /// Compute the total, the high-or-critical count and the four field
    /// groupings for `asset_ids` in a single pass.
    async fn summarize(&self, asset_ids: &[AssetId]) -> Result<SummaryBuckets, DocumentStoreError>;
}
