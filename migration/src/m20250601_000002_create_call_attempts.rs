use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CallAttempts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CallAttempts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CallAttempts::AccountId).uuid().not_null())
                    .col(ColumnDef::new(CallAttempts::QueueEntryId).uuid())
                    .col(ColumnDef::new(CallAttempts::LeadId).uuid().not_null())
                    .col(ColumnDef::new(CallAttempts::Provider).string().not_null())
                    .col(ColumnDef::new(CallAttempts::FromNumber).string().not_null())
                    .col(ColumnDef::new(CallAttempts::ToNumber).string().not_null())
                    .col(ColumnDef::new(CallAttempts::Channel).string().not_null())
                    .col(ColumnDef::new(CallAttempts::Status).string().not_null())
                    .col(ColumnDef::new(CallAttempts::ProviderCallId).string())
                    .col(ColumnDef::new(CallAttempts::Outcome).string())
                    .col(ColumnDef::new(CallAttempts::StartedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(CallAttempts::EndedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(CallAttempts::Metadata).json().not_null())
                    .col(
                        ColumnDef::new(CallAttempts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CallAttempts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CallAttempts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CallAttempts {
    Table,
    Id,
    AccountId,
    QueueEntryId,
    LeadId,
    Provider,
    FromNumber,
    ToNumber,
    Channel,
    Status,
    ProviderCallId,
    Outcome,
    StartedAt,
    EndedAt,
    Metadata,
    CreatedAt,
    UpdatedAt,
}
