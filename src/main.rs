//! BizTime server binary

use anyhow::{Context, Result};
use biztime::config::{AppConfig, StorageBackend};
use biztime::core::store::Store;
use biztime::server::ServerBuilder;
use biztime::storage::InMemoryStore;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store = open_store(&config).await?;
    tracing::info!(
        backend = store.backend(),
        paid_date_policy = ?config.paid_date_policy,
        "Starting BizTime"
    );

    ServerBuilder::from_config(&config)
        .with_shared_store(store)
        .serve(&config.bind)
        .await
}

async fn open_store(config: &AppConfig) -> Result<Arc<dyn Store>> {
    match config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StorageBackend::Postgres => open_postgres(config).await,
    }
}

#[cfg(feature = "postgres")]
async fn open_postgres(config: &AppConfig) -> Result<Arc<dyn Store>> {
    use biztime::storage::PostgresStore;

    let store = PostgresStore::connect(&config.database)
        .await
        .context("Failed to connect to PostgreSQL")?;
    if config.database.run_migrations {
        store.migrate().await.context("Failed to run migrations")?;
        tracing::info!("Migrations applied");
    }
    Ok(Arc::new(store))
}

#[cfg(not(feature = "postgres"))]
async fn open_postgres(_config: &AppConfig) -> Result<Arc<dyn Store>> {
    anyhow::bail!("PostgreSQL storage requested but the `postgres` feature is disabled")
}
