use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog;
use crate::clients::SourceAdapter;
use crate::constants::{limits, sources};
use crate::db::Store;
use crate::models::ComponentRecord;

/// Advisory appended to an otherwise error-free response when live
/// sources produced nothing and the reference catalog answered instead.
const FALLBACK_NOTICE: &str = "No live source results - serving built-in reference catalog";

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub search_term: String,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
    #[serde(default = "default_limit_per_source")]
    pub limit_per_source: u32,
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
}

impl SearchRequest {
    #[must_use]
    pub fn new(search_term: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            search_term: search_term.into(),
            category: category.into(),
            sources: default_sources(),
            limit_per_source: default_limit_per_source(),
            use_cache: default_use_cache(),
        }
    }
}

fn default_sources() -> Vec<String> {
    crate::constants::KNOWN_SOURCES
        .iter()
        .map(ToString::to_string)
        .collect()
}

const fn default_limit_per_source() -> u32 {
    limits::DEFAULT_LIMIT_PER_SOURCE
}

const fn default_use_cache() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub success: bool,
    pub search_term: String,
    pub category: String,
    pub total_found: usize,
    pub components: Vec<ComponentRecord>,
    /// Per-source raw hit counts before deduplication. A cache hit
    /// reports the single pseudo-source "cache"; the fallback path
    /// reports "demo".
    pub sources: HashMap<String, usize>,
    pub errors: Vec<String>,
    pub search_time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("search term cannot be empty")]
    EmptyTerm,
    #[error("unknown source: {0}")]
    UnknownSource(String),
}

/// Fans a search out to the requested distributors, merges what comes
/// back and keeps the cache warm. Individual source failures degrade the
/// response instead of failing it.
pub struct SearchService {
    store: Store,
    adapters: Vec<Arc<dyn SourceAdapter>>,
}

impl SearchService {
    #[must_use]
    pub const fn new(store: Store, adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self { store, adapters }
    }

    fn adapter(&self, id: &str) -> Option<Arc<dyn SourceAdapter>> {
        self.adapters.iter().find(|a| a.id() == id).cloned()
    }

    /// Hard request validation, checked before any fan-out. An empty
    /// sources list is legal and routes straight to the fallback.
    fn validate(&self, request: &SearchRequest) -> Result<(), SearchError> {
        if request.search_term.trim().is_empty() {
            return Err(SearchError::EmptyTerm);
        }
        for id in &request.sources {
            if self.adapter(id).is_none() {
                return Err(SearchError::UnknownSource(id.clone()));
            }
        }
        Ok(())
    }

    pub async fn search(&self, request: SearchRequest) -> Result<SearchResult, SearchError> {
        self.validate(&request)?;

        let started = Instant::now();
        let term = request.search_term.trim().to_string();

        if request.use_cache {
            match self.store.cached_components(&term, &request.category).await {
                Ok(Some(cached)) => {
                    info!("cache hit: {} components for '{}'", cached.len(), term);
                    let mut source_counts = HashMap::new();
                    source_counts.insert(sources::CACHE.to_string(), cached.len());
                    return Ok(SearchResult {
                        success: true,
                        search_term: term,
                        category: request.category,
                        total_found: cached.len(),
                        components: cached,
                        sources: source_counts,
                        errors: Vec::new(),
                        search_time_ms: elapsed_ms(started),
                    });
                }
                Ok(None) => {}
                // Unreachable cache is a miss, never a failure.
                Err(err) => warn!("cache read failed, treating as miss: {err}"),
            }
        }

        let selected: Vec<Arc<dyn SourceAdapter>> = request
            .sources
            .iter()
            .filter_map(|id| self.adapter(id))
            .collect();

        let outcomes = futures::future::join_all(selected.iter().map(|adapter| {
            let term = term.clone();
            let limit = request.limit_per_source;
            async move { (adapter.id(), adapter.search(&term, limit).await) }
        }))
        .await;

        let mut source_counts: HashMap<String, usize> = HashMap::new();
        let mut errors: Vec<String> = Vec::new();
        let mut collected: Vec<ComponentRecord> = Vec::new();

        for (id, outcome) in outcomes {
            match outcome {
                Ok(mut records) => {
                    debug!("{}: {} records for '{}'", id, records.len(), term);
                    source_counts.insert(id.to_string(), records.len());
                    collected.append(&mut records);
                }
                Err(err) => {
                    warn!("source failed: {err}");
                    errors.push(err.to_string());
                }
            }
        }

        // The taxonomy tag belongs to the request, not the vendor.
        for record in &mut collected {
            record.category.clone_from(&request.category);
        }

        let mut components = dedupe_by_part_number(collected);
        rank_by_price(&mut components);

        let fallback_used = components.is_empty();
        if fallback_used {
            components = catalog::fallback_components(&term, &request.category);
            info!(
                "no live results for '{}', fallback produced {} components",
                term,
                components.len()
            );
            source_counts.insert(sources::DEMO.to_string(), components.len());
            if errors.is_empty() {
                errors.push(FALLBACK_NOTICE.to_string());
            }
        } else {
            let mut saved = 0usize;
            for record in &components {
                match self.store.cache_component(record, &term).await {
                    Ok(()) => saved += 1,
                    // Write failures must not fail the search.
                    Err(err) => warn!("failed to cache {}: {err}", record.part_number),
                }
            }
            debug!("cached {} components for '{}'", saved, term);
        }

        let total_found = components.len();
        Ok(SearchResult {
            success: total_found > 0,
            search_term: term,
            category: request.category,
            total_found,
            components,
            sources: source_counts,
            errors,
            search_time_ms: elapsed_ms(started),
        })
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Collapses case-insensitive duplicate part numbers, keeping the first
/// occurrence. Input order is adapter order, so earlier sources win.
fn dedupe_by_part_number(records: Vec<ComponentRecord>) -> Vec<ComponentRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(records.len());

    for record in records {
        if seen.insert(record.part_number.to_lowercase()) {
            unique.push(record);
        }
    }

    unique
}

/// Stable ascending sort by parsed unit price. Unparseable prices rank
/// last and keep their relative order.
fn rank_by_price(records: &mut [ComponentRecord]) {
    records.sort_by(|a, b| a.sort_price().total_cmp(&b.sort_price()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Availability, LifecycleStatus, Pricing};

    fn record(part_number: &str, unit_price: &str, source: &str) -> ComponentRecord {
        ComponentRecord {
            part_number: part_number.to_string(),
            manufacturer: "Mfg".to_string(),
            description: "desc".to_string(),
            category: "processor".to_string(),
            datasheet_url: None,
            product_url: None,
            specifications: std::collections::HashMap::new(),
            pricing: Pricing {
                unit_price: unit_price.to_string(),
                min_qty: 1,
                price_breaks: Vec::new(),
            },
            availability: Availability::default(),
            lifecycle_status: LifecycleStatus::Active,
            source: source.to_string(),
        }
    }

    #[test]
    fn dedupe_is_case_insensitive_and_keeps_first() {
        let records = vec![
            record("STM32F407VGT6", "$12.50", "digikey"),
            record("stm32f407vgt6", "$11.00", "mouser"),
            record("TPS65263RHBR", "$4.50", "mouser"),
        ];

        let unique = dedupe_by_part_number(records);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].part_number, "STM32F407VGT6");
        assert_eq!(unique[0].source, "digikey");
        assert_eq!(unique[0].pricing.unit_price, "$12.50");
    }

    #[test]
    fn dedupe_is_idempotent() {
        let records = vec![
            record("A1", "$1.00", "digikey"),
            record("a1", "$2.00", "mouser"),
            record("B2", "$3.00", "mouser"),
        ];

        let once = dedupe_by_part_number(records);
        let twice = dedupe_by_part_number(once.clone());
        assert_eq!(once.len(), twice.len());
        let parts: Vec<&str> = twice.iter().map(|r| r.part_number.as_str()).collect();
        assert_eq!(parts, vec!["A1", "B2"]);
    }

    #[test]
    fn ranking_sorts_ascending_by_parsed_price() {
        let mut records = vec![
            record("HIGH", "$85.00", "digikey"),
            record("LOW", "$0.35", "digikey"),
            record("MID", "$12.50", "mouser"),
        ];

        rank_by_price(&mut records);
        let parts: Vec<&str> = records.iter().map(|r| r.part_number.as_str()).collect();
        assert_eq!(parts, vec!["LOW", "MID", "HIGH"]);
    }

    #[test]
    fn unparseable_prices_sort_after_every_parseable_price() {
        let mut records = vec![
            record("NOPRICE1", "", "digikey"),
            record("EXPENSIVE", "$1,234.56", "digikey"),
            record("NOPRICE2", "contact us", "mouser"),
            record("CHEAP", "$0.45", "mouser"),
        ];

        rank_by_price(&mut records);
        let parts: Vec<&str> = records.iter().map(|r| r.part_number.as_str()).collect();
        // Parseable ones first, then the unparseable pair in their
        // original relative order (stable sort).
        assert_eq!(parts, vec!["CHEAP", "EXPENSIVE", "NOPRICE1", "NOPRICE2"]);
    }

    #[test]
    fn request_defaults_cover_optional_fields() {
        let request: SearchRequest =
            serde_json::from_str(r#"{"search_term": "STM32F4", "category": "processor"}"#)
                .unwrap();
        assert_eq!(request.sources, vec!["digikey", "mouser"]);
        assert_eq!(request.limit_per_source, 10);
        assert!(request.use_cache);

        // An explicit empty list stays empty, it is not re-defaulted.
        let request: SearchRequest =
            serde_json::from_str(r#"{"search_term": "STM32F4", "sources": []}"#).unwrap();
        assert!(request.sources.is_empty());
        assert_eq!(request.category, "");
    }
}
