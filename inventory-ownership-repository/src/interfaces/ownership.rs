//! This module defines the `OwnershipRepository` trait and its transaction
//! handle. The relational store is the source of asset identity: it issues
//! asset ids and records which company owns each asset.
use inventory_shared::{AssetId, CompanyId, UserId};

use crate::errors::OwnershipRepositoryError;

/// A trait that defines the interface for the relational ownership store.
///
/// Read operations run outside any transaction. Mutations of identity
/// records go through an [`OwnershipTransaction`] obtained from [`begin`],
/// so callers can hold the relational change open while they write to
/// another store and roll it back if that write fails.
///
/// [`begin`]: OwnershipRepository::begin
#[async_trait::async_trait]
pub trait OwnershipRepository: Send + Sync {
    /// Resolves a username scoped to a company.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when no user with that name belongs to the company.
    async fn find_user_id(
        &self,
        username: &str,
        company_id: CompanyId,
    ) -> Result<Option<UserId>, OwnershipRepositoryError>;

    /// Returns the company owning `asset_id`, or `None` if no identity record exists.
    async fn company_of(
        &self,
        asset_id: AssetId,
    ) -> Result<Option<CompanyId>, OwnershipRepositoryError>;

    /// Returns every asset id owned by the company, in ascending order.
    async fn asset_ids_for_company(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<AssetId>, OwnershipRepositoryError>;

    /// Opens a transaction for identity-record mutations.
    async fn begin(&self) -> Result<Box<dyn OwnershipTransaction>, OwnershipRepositoryError>;
}

/// An open relational transaction.
///
/// Changes become visible to other readers only after [`commit`]. Dropping a
/// handle without committing discards its changes.
///
/// [`commit`]: OwnershipTransaction::commit
#[async_trait::async_trait]
pub trait OwnershipTransaction: Send {
    /// Inserts an identity record and returns the id issued by the store.
    async fn insert_identity(
        &mut self,
        owner_user_id: UserId,
        company_id: CompanyId,
    ) -> Result<AssetId, OwnershipRepositoryError>;

    /// Deletes the identity record for `asset_id` and returns the number of rows removed.
    async fn delete_identity(&mut self, asset_id: AssetId) -> Result<u64, OwnershipRepositoryError>;

    /// Makes the transaction's changes durable.
    async fn commit(&mut self) -> Result<(), OwnershipRepositoryError>;

    /// Discards the transaction's changes.
    async fn rollback(&mut self) -> Result<(), OwnershipRepositoryError>;
}
