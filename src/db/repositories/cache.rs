use std::collections::HashMap;

use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Serialize;

use crate::constants::cache;
use crate::entities::{component_cache, prelude::*};
use crate::models::{ComponentRecord, LifecycleStatus};

pub struct ComponentCacheRepository {
    conn: DatabaseConnection,
}

impl ComponentCacheRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Fetches unexpired Active/NRND rows whose stored search term
    /// contains the given term, scoped to the exact category. Active rows
    /// come first, then NRND, most recently cached first within each,
    /// capped at the lookup limit. `None` means a miss.
    pub async fn lookup(
        &self,
        search_term: &str,
        category: &str,
    ) -> Result<Option<Vec<ComponentRecord>>> {
        let now = chrono::Utc::now().to_rfc3339();

        // SQLite LIKE is case-insensitive for ASCII, which covers part
        // numbers and search terms.
        let mut rows = ComponentCache::find()
            .filter(component_cache::Column::SearchTerm.contains(search_term))
            .filter(component_cache::Column::Category.eq(category))
            .filter(component_cache::Column::ExpiresAt.gt(&now))
            .filter(component_cache::Column::LifecycleStatus.is_in([
                LifecycleStatus::Active.as_str(),
                LifecycleStatus::Nrnd.as_str(),
            ]))
            .order_by_desc(component_cache::Column::CachedAt)
            .all(&self.conn)
            .await?;

        // Stable sort keeps the cached_at ordering within each rank.
        rows.sort_by_key(|row| LifecycleStatus::parse(&row.lifecycle_status).cache_rank());
        rows.truncate(cache::MAX_LOOKUP_RESULTS);

        if rows.is_empty() {
            return Ok(None);
        }

        Ok(Some(rows.into_iter().map(record_from_row).collect()))
    }

    /// Inserts or refreshes the row for this part number. A conflict
    /// overwrites description, pricing, availability, both timestamps and
    /// the search term; the rest of the row keeps its original values.
    pub async fn upsert(&self, record: &ComponentRecord, search_term: &str) -> Result<()> {
        let now = chrono::Utc::now();
        let expires_at = (now + chrono::Duration::days(cache::COMPONENT_TTL_DAYS)).to_rfc3339();

        let active_model = component_cache::ActiveModel {
            part_number: Set(record.part_number.clone()),
            manufacturer: Set(record.manufacturer.clone()),
            description: Set(record.description.clone()),
            category: Set(record.category.clone()),
            datasheet_url: Set(record.datasheet_url.clone()),
            product_url: Set(record.product_url.clone()),
            specifications: Set(serde_json::to_string(&record.specifications)?),
            pricing: Set(serde_json::to_string(&record.pricing)?),
            availability: Set(serde_json::to_string(&record.availability)?),
            lifecycle_status: Set(record.lifecycle_status.as_str().to_string()),
            source: Set(record.source.clone()),
            search_term: Set(search_term.to_string()),
            cached_at: Set(now.to_rfc3339()),
            expires_at: Set(expires_at),
        };

        ComponentCache::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(component_cache::Column::PartNumber)
                    .update_columns([
                        component_cache::Column::Description,
                        component_cache::Column::Pricing,
                        component_cache::Column::Availability,
                        component_cache::Column::CachedAt,
                        component_cache::Column::ExpiresAt,
                        component_cache::Column::SearchTerm,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    /// Deletes every expired row and reports how many went away.
    pub async fn sweep_expired(&self) -> Result<u64> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = ComponentCache::delete_many()
            .filter(component_cache::Column::ExpiresAt.lt(&now))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn stats(&self) -> Result<CacheStats> {
        let now = chrono::Utc::now().to_rfc3339();

        let total_cached = ComponentCache::find().count(&self.conn).await?;
        let active_components = ComponentCache::find()
            .filter(component_cache::Column::ExpiresAt.gt(&now))
            .count(&self.conn)
            .await?;

        let rows: Vec<(String, String)> = ComponentCache::find()
            .select_only()
            .column(component_cache::Column::Category)
            .column(component_cache::Column::Source)
            .into_tuple()
            .all(&self.conn)
            .await?;

        let mut by_category: HashMap<String, u64> = HashMap::new();
        let mut by_source: HashMap<String, u64> = HashMap::new();
        for (category, source) in rows {
            *by_category.entry(category).or_default() += 1;
            *by_source.entry(source).or_default() += 1;
        }

        Ok(CacheStats {
            total_cached,
            active_components,
            expired_components: total_cached.saturating_sub(active_components),
            by_category,
            by_source,
        })
    }
}

fn record_from_row(row: component_cache::Model) -> ComponentRecord {
    ComponentRecord {
        specifications: serde_json::from_str(&row.specifications).unwrap_or_default(),
        pricing: serde_json::from_str(&row.pricing).unwrap_or_default(),
        availability: serde_json::from_str(&row.availability).unwrap_or_default(),
        lifecycle_status: LifecycleStatus::parse(&row.lifecycle_status),
        part_number: row.part_number,
        manufacturer: row.manufacturer,
        description: row.description,
        category: row.category,
        datasheet_url: row.datasheet_url,
        product_url: row.product_url,
        source: row.source,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub total_cached: u64,
    pub active_components: u64,
    pub expired_components: u64,
    pub by_category: HashMap<String, u64>,
    pub by_source: HashMap<String, u64>,
}
