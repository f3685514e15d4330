use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::ComponentRecord;
use crate::services::search::{SearchRequest, SearchResult, SearchService};

#[derive(Debug, Clone, Deserialize)]
pub struct BatchSearchRequest {
    pub searches: Vec<SearchRequest>,
}

/// One entry per input request, in input order. Failed requests keep
/// their slot instead of aborting the batch.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Success(SearchResult),
    Failure {
        search_term: String,
        category: String,
        components: Vec<ComponentRecord>,
        error: String,
    },
}

impl BatchEntry {
    #[must_use]
    pub const fn total_found(&self) -> usize {
        match self {
            Self::Success(result) => result.total_found,
            Self::Failure { .. } => 0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub total_components: usize,
    pub total_searches: usize,
    pub results: Vec<BatchEntry>,
    pub timestamp: String,
}

/// Runs many searches concurrently and aggregates their outcomes.
pub struct BatchSearchService {
    search: Arc<SearchService>,
}

impl BatchSearchService {
    #[must_use]
    pub const fn new(search: Arc<SearchService>) -> Self {
        Self { search }
    }

    pub async fn search_many(&self, requests: Vec<SearchRequest>) -> BatchResult {
        let total_searches = requests.len();
        info!("running batch of {} searches", total_searches);

        let results = futures::future::join_all(requests.into_iter().map(|request| {
            let service = Arc::clone(&self.search);
            async move {
                let search_term = request.search_term.clone();
                let category = request.category.clone();
                match service.search(request).await {
                    Ok(result) => BatchEntry::Success(result),
                    Err(err) => {
                        warn!("batch entry '{}' failed: {err}", search_term);
                        BatchEntry::Failure {
                            search_term,
                            category,
                            components: Vec::new(),
                            error: err.to_string(),
                        }
                    }
                }
            }
        }))
        .await;

        let total_components = results.iter().map(BatchEntry::total_found).sum();

        BatchResult {
            total_components,
            total_searches,
            results,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
