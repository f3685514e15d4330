use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tracing::info;

use crate::models::ComponentRecord;

pub mod migrator;
pub mod repositories;

pub use repositories::cache::CacheStats;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn component_cache_repo(&self) -> repositories::cache::ComponentCacheRepository {
        repositories::cache::ComponentCacheRepository::new(self.conn.clone())
    }

    pub async fn cached_components(
        &self,
        search_term: &str,
        category: &str,
    ) -> Result<Option<Vec<ComponentRecord>>> {
        self.component_cache_repo()
            .lookup(search_term, category)
            .await
    }

    pub async fn cache_component(
        &self,
        record: &ComponentRecord,
        search_term: &str,
    ) -> Result<()> {
        self.component_cache_repo().upsert(record, search_term).await
    }

    pub async fn sweep_expired_components(&self) -> Result<u64> {
        self.component_cache_repo().sweep_expired().await
    }

    pub async fn component_cache_stats(&self) -> Result<CacheStats> {
        self.component_cache_repo().stats().await
    }
}
