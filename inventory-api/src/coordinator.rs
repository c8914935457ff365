//! Cross-store create/read/update/delete.
//!
//! The two stores have no shared transaction manager, so multi-store writes
//! follow a fixed order with an explicit undo for each forward step:
//!
//! | Operation | Forward steps | Undo on failure |
//! |---|---|---|
//! | create | insert identity, insert detail, commit | roll back identity; delete detail if it may have been written |
//! | delete | delete identity, delete detail, commit | roll back identity |
//!
//! Undo steps are best-effort: a failed rollback is logged and the original
//! error is still returned. A process crash between the detail write and the
//! commit can leave an orphan in one store; nothing here repairs it.

use std::collections::HashSet;

use chrono::Utc;
use inventory_ownership_repository::OwnershipTransaction;
use inventory_shared::{AssetDetail, AssetId, AssetPatch, CompanyId, NewAsset, UserId};
use tracing::{debug, error, info, warn};

use crate::context::Stores;
use crate::errors::AssetError;
use crate::listing::AssetListQuery;

/// The user on whose behalf an asset is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerRef {
    pub username: String,
    pub company_id: CompanyId,
}

impl OwnerRef {
    pub fn new(username: impl Into<String>, company_id: CompanyId) -> Self {
        Self {
            username: username.into(),
            company_id,
        }
    }
}

/// Sequences asset operations across the ownership store, the document
/// store and the cache.
#[derive(Clone)]
pub struct AssetCoordinator {
    stores: Stores,
}

impl AssetCoordinator {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Resolve a username within a company.
    pub async fn lookup_user(
        &self,
        username: &str,
        company_id: CompanyId,
    ) -> Result<UserId, AssetError> {
        self.stores
            .bounded(
                "find user",
                self.stores.ownership.find_user_id(username, company_id),
            )
            .await?
            .ok_or_else(|| AssetError::not_found("User not found for the given company."))
    }

    /// Create an asset and return the id issued by the ownership store.
    ///
    /// On success both stores hold the asset. On failure the identity
    /// insert is rolled back and, if the detail record was already written,
    /// it is deleted again.
    pub async fn create(&self, owner: &OwnerRef, new: NewAsset) -> Result<AssetId, AssetError> {
        let company_id = owner.company_id;
        let user_id = self.lookup_user(&owner.username, company_id).await?;

        let mut tx = self
            .stores
            .bounded("begin transaction", self.stores.ownership.begin())
            .await?;

        let asset_id = match self
            .stores
            .bounded("insert identity", tx.insert_identity(user_id, company_id))
            .await
        {
            Ok(asset_id) => asset_id,
            Err(e) => {
                self.roll_back(tx.as_mut(), None).await;
                return Err(e);
            }
        };
        debug!(asset_id = %asset_id, company_id = %company_id, "Identity record inserted");

        let asset = AssetDetail::from_new(asset_id, new, Utc::now());
        if let Err(e) = self
            .stores
            .bounded("insert detail", self.stores.documents.insert_asset(&asset))
            .await
        {
            warn!(asset_id = %asset_id, error = %e, "Detail insert failed, undoing identity insert");
            self.roll_back(tx.as_mut(), Some(asset_id)).await;
            // A timed-out insert may still have been applied
            self.remove_uncommitted_detail(asset_id).await;
            return Err(e);
        }

        // A failed commit has already ended the transaction
        if let Err(e) = self.stores.bounded("commit", tx.commit()).await {
            warn!(asset_id = %asset_id, error = %e, "Commit failed, undoing detail insert");
            self.remove_uncommitted_detail(asset_id).await;
            return Err(e);
        }

        self.stores.cache.put_asset(&asset).await;
        self.stores
            .cache
            .invalidate_company_aggregations(company_id)
            .await;

        info!(asset_id = %asset_id, company_id = %company_id, user_id = %user_id, "Asset created");
        Ok(asset_id)
    }

    /// Read an asset's detail record, from the cache when possible.
    ///
    /// The ownership store is not consulted.
    pub async fn get(&self, asset_id: AssetId) -> Result<AssetDetail, AssetError> {
        if let Some(asset) = self.stores.cache.get_asset(asset_id).await {
            return Ok(asset);
        }

        let asset = self
            .stores
            .bounded("get detail", self.stores.documents.get_asset(asset_id))
            .await?
            .ok_or_else(|| AssetError::not_found("Asset not found"))?;

        self.stores.cache.put_asset(&asset).await;
        Ok(asset)
    }

    /// Apply a partial update to an asset's detail record.
    ///
    /// `updated_at` is always bumped, even for an empty patch.
    pub async fn update(&self, asset_id: AssetId, patch: &AssetPatch) -> Result<(), AssetError> {
        let matched = self
            .stores
            .bounded(
                "update detail",
                self.stores
                    .documents
                    .update_asset(asset_id, patch, Utc::now()),
            )
            .await?;
        if !matched {
            return Err(AssetError::not_found("Asset not found"));
        }

        self.stores.cache.invalidate_asset(asset_id).await;
        let company_id = self.resolve_company(asset_id).await;
        self.invalidate_aggregations(company_id).await;

        info!(asset_id = %asset_id, "Asset updated");
        Ok(())
    }

    /// Delete an asset from both stores.
    ///
    /// The identity delete stays uncommitted until the detail record is
    /// gone, and is rolled back if the detail delete fails or matches nothing.
    pub async fn delete(&self, asset_id: AssetId) -> Result<(), AssetError> {
        let company_id = self.resolve_company(asset_id).await;

        let mut tx = self
            .stores
            .bounded("begin transaction", self.stores.ownership.begin())
            .await?;

        match self
            .stores
            .bounded("delete identity", tx.delete_identity(asset_id))
            .await
        {
            Ok(0) => {
                self.roll_back(tx.as_mut(), Some(asset_id)).await;
                return Err(AssetError::not_found("Asset not found in relational store"));
            }
            Ok(_) => {}
            Err(e) => {
                self.roll_back(tx.as_mut(), Some(asset_id)).await;
                return Err(e);
            }
        }

        match self
            .stores
            .bounded("delete detail", self.stores.documents.delete_asset(asset_id))
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                self.roll_back(tx.as_mut(), Some(asset_id)).await;
                return Err(AssetError::not_found("Asset not found in document store"));
            }
            Err(e) => {
                self.roll_back(tx.as_mut(), Some(asset_id)).await;
                return Err(e);
            }
        }

        if let Err(e) = self.stores.bounded("commit", tx.commit()).await {
            error!(
                asset_id = %asset_id,
                error = %e,
                "Commit failed after the detail record was deleted; identity record is orphaned"
            );
            self.stores.cache.invalidate_asset(asset_id).await;
            self.invalidate_aggregations(company_id).await;
            return Err(e);
        }

        self.stores.cache.invalidate_asset(asset_id).await;
        self.invalidate_aggregations(company_id).await;

        info!(asset_id = %asset_id, "Asset deleted");
        Ok(())
    }

    /// List a company's assets, filtered and sorted by `query`.
    ///
    /// Identity records without a detail record are skipped.
    pub async fn list(
        &self,
        company_id: CompanyId,
        query: &AssetListQuery,
    ) -> Result<Vec<AssetDetail>, AssetError> {
        let asset_ids = self
            .stores
            .bounded(
                "resolve company assets",
                self.stores.ownership.asset_ids_for_company(company_id),
            )
            .await?;
        if asset_ids.is_empty() {
            return Ok(Vec::new());
        }

        let assets = self
            .stores
            .bounded("get details", self.stores.documents.get_assets(&asset_ids))
            .await?;

        if assets.len() < asset_ids.len() {
            let found: HashSet<AssetId> = assets.iter().map(|asset| asset.asset_id).collect();
            for asset_id in asset_ids.iter().filter(|id| !found.contains(id)) {
                warn!(
                    asset_id = %asset_id,
                    company_id = %company_id,
                    "Identity record has no detail record, skipping"
                );
            }
        }

        Ok(query.apply(assets))
    }

    async fn roll_back(&self, tx: &mut dyn OwnershipTransaction, asset_id: Option<AssetId>) {
        match self.stores.bounded("rollback", tx.rollback()).await {
            Ok(()) => warn!(asset_id = ?asset_id, "Rolled back relational transaction"),
            Err(e) => error!(
                asset_id = ?asset_id,
                error = %e,
                "Failed to roll back relational transaction"
            ),
        }
    }

    async fn remove_uncommitted_detail(&self, asset_id: AssetId) {
        match self
            .stores
            .bounded("delete detail", self.stores.documents.delete_asset(asset_id))
            .await
        {
            Ok(true) => warn!(asset_id = %asset_id, "Removed detail record of uncommitted asset"),
            Ok(false) => debug!(asset_id = %asset_id, "No detail record to remove"),
            Err(e) => error!(
                asset_id = %asset_id,
                error = %e,
                "Failed to remove detail record of uncommitted asset"
            ),
        }
    }

    async fn resolve_company(&self, asset_id: AssetId) -> Option<CompanyId> {
        match self
            .stores
            .bounded("resolve company", self.stores.ownership.company_of(asset_id))
            .await
        {
            Ok(company_id) => company_id,
            Err(e) => {
                warn!(asset_id = %asset_id, error = %e, "Could not resolve owning company");
                None
            }
        }
    }

    /// Invalidate one company's aggregations, or every company's when the
    /// owner is unknown.
    async fn invalidate_aggregations(&self, company_id: Option<CompanyId>) {
        match company_id {
            Some(company_id) => {
                self.stores
                    .cache
                    .invalidate_company_aggregations(company_id)
                    .await
            }
            None => self.stores.cache.invalidate_all_aggregations().await,
        }
    }
}
