//! Dependency initialization and wiring for the inventory service.

use std::sync::Arc;
use std::time::Duration;

use inventory_document_repository::opensearch::IndexConfig;
use inventory_document_repository::{AssetDocumentStore, InMemoryAssetStore, OpenSearchAssetStore};
use inventory_ownership_repository::{
    InMemoryOwnershipRepository, OwnershipRepository, PostgresOwnershipRepository,
};
use inventory_shared::CompanyId;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::cache::AssetCache;
use crate::config::{AppConfig, ConnectionMode, StoreMode};
use crate::context::Stores;
use crate::errors::StartupError;
use crate::server::state::AppState;

/// Username seeded into the in-memory ownership store.
pub const DEMO_USERNAME: &str = "jdoe";

/// Company the demo user belongs to.
pub const DEMO_COMPANY_ID: i64 = 1;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Shared state handed to the HTTP router.
    pub state: AppState,
}

impl Dependencies {
    /// Connect the stores selected by `config` and wire them together.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(StartupError)` - If a store cannot be reached (OpenSearch only in fail-fast mode)
    pub async fn new(config: &AppConfig) -> Result<Self, StartupError> {
        info!(
            store_mode = ?config.store_mode,
            opensearch_url = %config.opensearch_url,
            connection_mode = ?config.connection_mode,
            retry_interval_secs = config.retry_interval.as_secs(),
            cache_enabled = config.cache_enabled,
            store_timeout_ms = config.store_timeout.as_millis() as u64,
            "Initializing dependencies"
        );

        let (ownership, documents) = match config.store_mode {
            StoreMode::Mock => Self::mock_stores().await,
            StoreMode::Live => {
                let ownership = Self::connect_to_postgres(config).await?;
                info!("PostgreSQL connection established");

                let documents = Self::connect_to_opensearch(
                    &config.opensearch_url,
                    IndexConfig::new(config.index_alias.clone(), config.index_version),
                    config.connection_mode,
                    config.retry_interval,
                )
                .await?;
                info!("OpenSearch connection established");

                (
                    Arc::new(ownership) as Arc<dyn OwnershipRepository>,
                    Arc::new(documents) as Arc<dyn AssetDocumentStore>,
                )
            }
        };

        let cache = AssetCache::new(config.cache_source().into_store(), config.cache_settings());
        let stores = Stores::new(ownership, documents, cache, config.store_timeout);

        Ok(Self {
            state: AppState::new(stores),
        })
    }

    /// In-memory stores with one demo user, for local development.
    async fn mock_stores() -> (Arc<dyn OwnershipRepository>, Arc<dyn AssetDocumentStore>) {
        let ownership = InMemoryOwnershipRepository::new();
        let user_id = ownership
            .add_user(DEMO_USERNAME, CompanyId(DEMO_COMPANY_ID))
            .await;

        info!(
            username = DEMO_USERNAME,
            user_id = %user_id,
            company_id = DEMO_COMPANY_ID,
            "Using in-memory stores"
        );

        (Arc::new(ownership), Arc::new(InMemoryAssetStore::new()))
    }

    async fn connect_to_postgres(
        config: &AppConfig,
    ) -> Result<PostgresOwnershipRepository, StartupError> {
        let url = config
            .database_url
            .as_deref()
            .ok_or_else(|| StartupError::config("DATABASE_URL must be set in live mode"))?;

        PostgresOwnershipRepository::connect(url, config.database_max_connections)
            .await
            .map_err(|e| StartupError::connection(format!("Failed to connect to PostgreSQL: {}", e)))
    }

    /// Connect to OpenSearch with retry logic based on connection mode.
    async fn connect_to_opensearch(
        url: &str,
        index_config: IndexConfig,
        mode: ConnectionMode,
        retry_interval: Duration,
    ) -> Result<OpenSearchAssetStore, StartupError> {
        loop {
            match Self::try_connect_opensearch(url, index_config.clone()).await {
                Ok(store) => return Ok(store),
                Err(e) => match mode {
                    ConnectionMode::FailFast => {
                        return Err(StartupError::connection(format!(
                            "Failed to connect to OpenSearch: {}",
                            e
                        )));
                    }
                    ConnectionMode::Retry => {
                        warn!(
                            opensearch_url = %url,
                            error = %e,
                            retry_interval_secs = retry_interval.as_secs(),
                            "Failed to connect to OpenSearch, retrying..."
                        );
                        sleep(retry_interval).await;
                    }
                },
            }
        }
    }

    /// Create the store and make sure its index and alias exist.
    async fn try_connect_opensearch(
        url: &str,
        index_config: IndexConfig,
    ) -> Result<OpenSearchAssetStore, StartupError> {
        let store = OpenSearchAssetStore::new(url, index_config)
            .await
            .map_err(|e| StartupError::connection(format!("Failed to create OpenSearch store: {}", e)))?;

        store
            .ensure_index_exists()
            .await
            .map_err(|e| StartupError::connection(format!("Failed to ensure index exists: {}", e)))?;

        Ok(store)
    }
}
