use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WorkflowProgress::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WorkflowProgress::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WorkflowProgress::AccountId).uuid().not_null())
                    .col(
                        ColumnDef::new(WorkflowProgress::WorkflowId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WorkflowProgress::LeadId).uuid().not_null())
                    .col(
                        ColumnDef::new(WorkflowProgress::CampaignId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WorkflowProgress::Status).string().not_null())
                    .col(ColumnDef::new(WorkflowProgress::NextStepAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(WorkflowProgress::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(WorkflowProgress::UpdatedAt)
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
            .drop_table(Table::drop().table(WorkflowProgress::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum WorkflowProgress {
    Table,
    Id,
    AccountId,
    WorkflowId,
    LeadId,
    CampaignId,
    Status,
    NextStepAt,
    CreatedAt,
    UpdatedAt,
}
