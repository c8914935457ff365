//! In-memory ownership store for development and testing.
//!
//! Mirrors the PostgreSQL behavior that callers depend on: ids come from a
//! sequence that is not rewound by rollbacks, and transactional changes are
//! invisible to readers until commit.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use inventory_shared::{AssetId, CompanyId, UserId};
use tokio::sync::Mutex;

use crate::{OwnershipRepository, OwnershipRepositoryError, OwnershipTransaction};

/// A committed identity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityRecord {
    pub asset_id: AssetId,
    pub owner_user_id: UserId,
    pub company_id: CompanyId,
}

struct UserRecord {
    user_id: UserId,
    username: String,
    company_id: CompanyId,
}

#[derive(Default)]
struct OwnershipState {
    users: Vec<UserRecord>,
    identities: BTreeMap<AssetId, IdentityRecord>,
    last_user_id: i64,
    last_asset_id: i64,
}

/// In-memory storage backend implementing [`OwnershipRepository`].
///
/// Cloning shares the underlying state.
#[derive(Clone, Default)]
pub struct InMemoryOwnershipRepository {
    state: Arc<Mutex<OwnershipState>>,
}

impl InMemoryOwnershipRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user in a company and returns the issued user id.
    pub async fn add_user(&self, username: impl Into<String>, company_id: CompanyId) -> UserId {
        let mut state = self.state.lock().await;
        state.last_user_id += 1;
        let user_id = UserId(state.last_user_id);
        state.users.push(UserRecord {
            user_id,
            username: username.into(),
            company_id,
        });
        user_id
    }

    /// Returns the committed identity record for `asset_id`.
    pub async fn identity(&self, asset_id: AssetId) -> Option<IdentityRecord> {
        self.state.lock().await.identities.get(&asset_id).copied()
    }

    /// Number of committed identity records.
    pub async fn identity_count(&self) -> usize {
        self.state.lock().await.identities.len()
    }
}

#[async_trait]
impl OwnershipRepository for InMemoryOwnershipRepository {
    async fn find_user_id(
        &self,
        username: &str,
        company_id: CompanyId,
    ) -> Result<Option<UserId>, OwnershipRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .find(|user| user.username == username && user.company_id == company_id)
            .map(|user| user.user_id))
    }

    async fn company_of(
        &self,
        asset_id: AssetId,
    ) -> Result<Option<CompanyId>, OwnershipRepositoryError> {
        let state = self.state.lock().await;
        Ok(state.identities.get(&asset_id).map(|record| record.company_id))
    }

    async fn asset_ids_for_company(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<AssetId>, OwnershipRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .identities
            .values()
            .filter(|record| record.company_id == company_id)
            .map(|record| record.asset_id)
            .collect())
    }

    async fn begin(&self) -> Result<Box<dyn OwnershipTransaction>, OwnershipRepositoryError> {
        Ok(Box::new(InMemoryOwnershipTransaction {
            state: Arc::clone(&self.state),
            inserts: Vec::new(),
            deletes: Vec::new(),
            finished: false,
        }))
    }
}

/// Staged changes against an [`InMemoryOwnershipRepository`].
pub struct InMemoryOwnershipTransaction {
    state: Arc<Mutex<OwnershipState>>,
    inserts: Vec<IdentityRecord>,
    deletes: Vec<AssetId>,
    finished: bool,
}

impl InMemoryOwnershipTransaction {
    fn ensure_open(&self) -> Result<(), OwnershipRepositoryError> {
        if self.finished {
            Err(OwnershipRepositoryError::TransactionClosed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl OwnershipTransaction for InMemoryOwnershipTransaction {
    async fn insert_identity(
        &mut self,
        owner_user_id: UserId,
        company_id: CompanyId,
    ) -> Result<AssetId, OwnershipRepositoryError> {
        self.ensure_open()?;
        let mut state = self.state.lock().await;
        state.last_asset_id += 1;
        let asset_id = AssetId(state.last_asset_id);
        self.inserts.push(IdentityRecord {
            asset_id,
            owner_user_id,
            company_id,
        });
        Ok(asset_id)
    }

    async fn delete_identity(&mut self, asset_id: AssetId) -> Result<u64, OwnershipRepositoryError> {
        self.ensure_open()?;
        if let Some(pos) = self.inserts.iter().position(|r| r.asset_id == asset_id) {
            self.inserts.remove(pos);
            return Ok(1);
        }
        if self.deletes.contains(&asset_id) {
            return Ok(0);
        }
        let state = self.state.lock().await;
        if state.identities.contains_key(&asset_id) {
            self.deletes.push(asset_id);
            Ok(1)
        } else {
            Ok(0)
        }
    }

    async fn commit(&mut self) -> Result<(), OwnershipRepositoryError> {
        self.ensure_open()?;
        self.finished = true;
        let mut state = self.state.lock().await;
        for record in self.inserts.drain(..) {
            state.identities.insert(record.asset_id, record);
        }
        for asset_id in self.deletes.drain(..) {
            state.identities.remove(&asset_id);
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), OwnershipRepositoryError> {
        self.ensure_open()?;
        self.finished = true;
        self.inserts.clear();
        self.deletes.clear();
        Ok(())
    }
}
