use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DispositionAudit::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DispositionAudit::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DispositionAudit::AccountId).uuid().not_null())
                    .col(ColumnDef::new(DispositionAudit::LeadId).uuid().not_null())
                    .col(ColumnDef::new(DispositionAudit::CallId).uuid())
                    .col(
                        ColumnDef::new(DispositionAudit::DispositionName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DispositionAudit::SetBy).string().not_null())
                    .col(ColumnDef::new(DispositionAudit::Confidence).double())
                    .col(
                        ColumnDef::new(DispositionAudit::LeadStatusBefore)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DispositionAudit::LeadStatusAfter)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DispositionAudit::StageBefore).string())
                    .col(ColumnDef::new(DispositionAudit::StageAfter).string())
                    .col(ColumnDef::new(DispositionAudit::TimeToDispositionMs).big_integer())
                    .col(ColumnDef::new(DispositionAudit::Actions).json().not_null())
                    .col(
                        ColumnDef::new(DispositionAudit::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DispositionErrors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DispositionErrors::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DispositionErrors::AccountId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DispositionErrors::LeadId).uuid().not_null())
                    .col(ColumnDef::new(DispositionErrors::Action).string().not_null())
                    .col(ColumnDef::new(DispositionErrors::Message).text().not_null())
                    .col(ColumnDef::new(DispositionErrors::Payload).json().not_null())
                    .col(
                        ColumnDef::new(DispositionErrors::CreatedAt)
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
            .drop_table(Table::drop().table(DispositionErrors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DispositionAudit::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum DispositionAudit {
    Table,
    Id,
    AccountId,
    LeadId,
    CallId,
    DispositionName,
    SetBy,
    Confidence,
    LeadStatusBefore,
    LeadStatusAfter,
    StageBefore,
    StageAfter,
    TimeToDispositionMs,
    Actions,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum DispositionErrors {
    Table,
    Id,
    AccountId,
    LeadId,
    Action,
    Message,
    Payload,
    CreatedAt,
}
