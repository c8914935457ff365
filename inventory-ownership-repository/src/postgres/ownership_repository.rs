use async_trait::async_trait;
use inventory_shared::{AssetId, CompanyId, UserId};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use crate::{OwnershipRepository, OwnershipRepositoryError, OwnershipTransaction};

/// PostgreSQL implementation of the ownership repository.
///
/// Identity records live in `asset_mgmt`; users are resolved from `users`.
/// Asset ids come from the `asset_mgmt.asset_id` sequence.
pub struct PostgresOwnershipRepository {
    pool: PgPool,
}

impl PostgresOwnershipRepository {
    /// Creates a new repository over an existing pool.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool with the required schema
    pub async fn new(pool: PgPool) -> Result<Self, OwnershipRepositoryError> {
        Ok(Self { pool })
    }

    /// Connects a new pool of at most `max_connections` connections.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, OwnershipRepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Self::new(pool).await
    }
}

#[async_trait]
impl OwnershipRepository for PostgresOwnershipRepository {
    async fn find_user_id(
        &self,
        username: &str,
        company_id: CompanyId,
    ) -> Result<Option<UserId>, OwnershipRepositoryError> {
        let user_id = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM users WHERE user_abbr = $1 AND comp_id = $2",
        )
        .bind(username)
        .bind(company_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user_id.map(UserId))
    }

    async fn company_of(
        &self,
        asset_id: AssetId,
    ) -> Result<Option<CompanyId>, OwnershipRepositoryError> {
        let company_id =
            sqlx::query_scalar::<_, i64>("SELECT comp_id FROM asset_mgmt WHERE asset_id = $1")
                .bind(asset_id.value())
                .fetch_optional(&self.pool)
                .await?;

        Ok(company_id.map(CompanyId))
    }

    async fn asset_ids_for_company(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<AssetId>, OwnershipRepositoryError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT asset_id FROM asset_mgmt WHERE comp_id = $1 ORDER BY asset_id",
        )
        .bind(company_id.value())
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(AssetId).collect())
    }

    async fn begin(&self) -> Result<Box<dyn OwnershipTransaction>, OwnershipRepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresOwnershipTransaction { tx: Some(tx) }))
    }
}

/// An open PostgreSQL transaction on `asset_mgmt`.
///
/// The underlying sqlx transaction rolls back on drop, so an abandoned
/// handle never leaves a half-written identity record behind.
pub struct PostgresOwnershipTransaction {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PostgresOwnershipTransaction {
    fn active(&mut self) -> Result<&mut Transaction<'static, Postgres>, OwnershipRepositoryError> {
        self.tx
            .as_mut()
            .ok_or(OwnershipRepositoryError::TransactionClosed)
    }
}

#[async_trait]
impl OwnershipTransaction for PostgresOwnershipTransaction {
    async fn insert_identity(
        &mut self,
        owner_user_id: UserId,
        company_id: CompanyId,
    ) -> Result<AssetId, OwnershipRepositoryError> {
        let tx = self.active()?;
        let asset_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO asset_mgmt (user_cr_id, comp_id) VALUES ($1, $2) RETURNING asset_id",
        )
        .bind(owner_user_id.value())
        .bind(company_id.value())
        .fetch_one(&mut **tx)
        .await?;

        debug!(asset_id, company_id = %company_id, "Identity record inserted");
        Ok(AssetId(asset_id))
    }

    async fn delete_identity(&mut self, asset_id: AssetId) -> Result<u64, OwnershipRepositoryError> {
        let tx = self.active()?;
        let result = sqlx::query("DELETE FROM asset_mgmt WHERE asset_id = $1")
            .bind(asset_id.value())
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn commit(&mut self) -> Result<(), OwnershipRepositoryError> {
        let tx = self
            .tx
            .take()
            .ok_or(OwnershipRepositoryError::TransactionClosed)?;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), OwnershipRepositoryError> {
        let tx = self
            .tx
            .take()
            .ok_or(OwnershipRepositoryError::TransactionClosed)?;
        tx.rollback().await?;
        Ok(())
    }
}
