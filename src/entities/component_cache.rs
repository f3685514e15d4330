use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "component_cache")]
pub struct Model {
    /// One row per component; a re-search of the same part overwrites it.
    #[sea_orm(primary_key, auto_increment = false)]
    pub part_number: String,
    pub manufacturer: String,
    pub description: String,
    pub category: String,
    pub datasheet_url: Option<String>,
    pub product_url: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub specifications: String,
    #[sea_orm(column_type = "Text")]
    pub pricing: String,
    #[sea_orm(column_type = "Text")]
    pub availability: String,
    pub lifecycle_status: String,
    pub source: String,
    pub search_term: String,
    pub cached_at: String, // SQLite doesn't strictly enforce types, but typically strings for ISO8601
    pub expires_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
