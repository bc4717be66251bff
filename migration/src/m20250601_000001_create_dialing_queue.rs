use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DialingQueue::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DialingQueue::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DialingQueue::AccountId).uuid().not_null())
                    .col(ColumnDef::new(DialingQueue::CampaignId).uuid().not_null())
                    .col(ColumnDef::new(DialingQueue::LeadId).uuid().not_null())
                    .col(ColumnDef::new(DialingQueue::PhoneNumber).string().not_null())
                    .col(ColumnDef::new(DialingQueue::Status).string().not_null())
                    .col(
                        ColumnDef::new(DialingQueue::Priority)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DialingQueue::Attempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DialingQueue::MaxAttempts)
                            .integer()
                            .not_null()
                            .default(3),
                    )
                    .col(ColumnDef::new(DialingQueue::ScheduledAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(DialingQueue::ClaimedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(DialingQueue::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(DialingQueue::UpdatedAt)
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
            .drop_table(Table::drop().table(DialingQueue::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum DialingQueue {
    Table,
    Id,
    AccountId,
    CampaignId,
    LeadId,
    PhoneNumber,
    Status,
    Priority,
    Attempts,
    MaxAttempts,
    ScheduledAt,
    ClaimedAt,
    CreatedAt,
    UpdatedAt,
}
