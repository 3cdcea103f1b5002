use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use stockroom_infra::store::{
    ensure_schema, InMemoryBlacklistStore, InMemoryHistoryStore, InMemoryProductStore,
    PostgresBlacklistStore, PostgresHistoryStore, PostgresProductStore,
};
use stockroom_infra::{BlacklistService, ProductService};

use crate::config::StorageConfig;

/// Services shared by every handler (injected via `Extension<Arc<AppServices>>`).
#[derive(Clone)]
pub struct AppServices {
    pub products: ProductService,
    pub blacklist: BlacklistService,
}

impl AppServices {
    /// Process-local stores; state is lost on restart.
    pub fn in_memory() -> Self {
        let blacklist = Arc::new(InMemoryBlacklistStore::new());
        Self {
            products: ProductService::new(
                Arc::new(InMemoryProductStore::new()),
                Arc::new(InMemoryHistoryStore::new()),
                blacklist.clone(),
            ),
            blacklist: BlacklistService::new(blacklist),
        }
    }

    /// Postgres-backed stores sharing one pool. Creates the schema if missing.
    pub async fn postgres(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        ensure_schema(&pool).await?;

        let blacklist = Arc::new(PostgresBlacklistStore::new(pool.clone()));
        Ok(Self {
            products: ProductService::new(
                Arc::new(PostgresProductStore::new(pool.clone())),
                Arc::new(PostgresHistoryStore::new(pool)),
                blacklist.clone(),
            ),
            blacklist: BlacklistService::new(blacklist),
        })
    }
}

pub async fn build_services(storage: &StorageConfig) -> anyhow::Result<AppServices> {
    match storage {
        StorageConfig::InMemory => {
            tracing::info!("using in-memory stores");
            Ok(AppServices::in_memory())
        }
        StorageConfig::Postgres {
            database_url,
            max_connections,
        } => {
            tracing::info!(max_connections, "using postgres stores");
            AppServices::postgres(database_url, *max_connections).await
        }
    }
}
