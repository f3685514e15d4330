use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ComponentCache::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComponentCache::PartNumber)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ComponentCache::Manufacturer)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ComponentCache::Description)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ComponentCache::Category).string().not_null())
                    .col(ColumnDef::new(ComponentCache::DatasheetUrl).string())
                    .col(ColumnDef::new(ComponentCache::ProductUrl).string())
                    .col(
                        ColumnDef::new(ComponentCache::Specifications)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ComponentCache::Pricing).text().not_null())
                    .col(
                        ColumnDef::new(ComponentCache::Availability)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ComponentCache::LifecycleStatus)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ComponentCache::Source).string().not_null())
                    .col(
                        ColumnDef::new(ComponentCache::SearchTerm)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ComponentCache::CachedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ComponentCache::ExpiresAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_component_cache_search_term")
                    .table(ComponentCache::Table)
                    .col(ComponentCache::SearchTerm)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_component_cache_category")
                    .table(ComponentCache::Table)
                    .col(ComponentCache::Category)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_component_cache_expires_at")
                    .table(ComponentCache::Table)
                    .col(ComponentCache::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ComponentCache::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ComponentCache {
    Table,
    PartNumber,
    Manufacturer,
    Description,
    Category,
    DatasheetUrl,
    ProductUrl,
    Specifications,
    Pricing,
    Availability,
    LifecycleStatus,
    Source,
    SearchTerm,
    CachedAt,
    ExpiresAt,
}
