use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProviderNumbers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProviderNumbers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProviderNumbers::AccountId).uuid().not_null())
                    .col(ColumnDef::new(ProviderNumbers::Provider).string().not_null())
                    .col(ColumnDef::new(ProviderNumbers::Number).string().not_null())
                    .col(
                        ColumnDef::new(ProviderNumbers::Capabilities)
                            .json()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProviderNumbers::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ProviderNumbers::ProviderPriority)
                            .integer()
                            .not_null()
                            .default(100),
                    )
                    .col(ColumnDef::new(ProviderNumbers::LastUsedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(ProviderNumbers::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ProviderNumbers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ProviderNumbers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_provider_numbers_account_number")
                    .table(ProviderNumbers::Table)
                    .col(ProviderNumbers::AccountId)
                    .col(ProviderNumbers::Number)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProviderNumbers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ProviderNumbers {
    Table,
    Id,
    AccountId,
    Provider,
    Number,
    Capabilities,
    Verified,
    ProviderPriority,
    LastUsedAt,
    Active,
    CreatedAt,
    UpdatedAt,
}
