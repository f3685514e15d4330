use std::sync::Arc;

use crate::clients::SourceAdapter;
use crate::clients::digikey::{DigiKeyClient, DigiKeyConfig};
use crate::clients::mouser::MouserClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{BatchSearchService, SearchService};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// This client should be reused across all HTTP-based services to enable
/// connection pooling and avoid socket exhaustion.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent(crate::constants::http::USER_AGENT)
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Config,

    pub store: Store,

    pub digikey: Arc<DigiKeyClient>,

    pub mouser: Arc<MouserClient>,

    pub search_service: Arc<SearchService>,

    pub batch_service: Arc<BatchSearchService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        // Create a shared HTTP client for all distributor adapters.
        // This enables connection pooling and avoids socket exhaustion.
        let http_client = build_shared_http_client(config.sources.request_timeout_seconds)?;

        let digikey = Arc::new(DigiKeyClient::with_shared_client(
            DigiKeyConfig {
                client_id: config.sources.digikey_client_id.clone(),
                client_secret: config.sources.digikey_client_secret.clone(),
            },
            http_client.clone(),
        ));
        let mouser = Arc::new(MouserClient::with_shared_client(
            config.sources.mouser_api_key.clone(),
            http_client,
        ));

        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![digikey.clone(), mouser.clone()];

        let search_service = Arc::new(SearchService::new(store.clone(), adapters));
        let batch_service = Arc::new(BatchSearchService::new(search_service.clone()));

        Ok(Self {
            config,
            store,
            digikey,
            mouser,
            search_service,
            batch_service,
        })
    }
}
