use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Dispositions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Dispositions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Dispositions::AccountId).uuid().not_null())
                    .col(ColumnDef::new(Dispositions::Name).string().not_null())
                    .col(ColumnDef::new(Dispositions::PipelineStage).string())
                    .col(
                        ColumnDef::new(Dispositions::CreatedAt)
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
                    .table(PipelineBoards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PipelineBoards::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PipelineBoards::AccountId).uuid().not_null())
                    .col(ColumnDef::new(PipelineBoards::Name).string().not_null())
                    .col(
                        ColumnDef::new(PipelineBoards::NormalizedName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PipelineBoards::CreatedAt)
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
                    .table(PipelinePositions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PipelinePositions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PipelinePositions::AccountId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PipelinePositions::LeadId).uuid().not_null())
                    .col(ColumnDef::new(PipelinePositions::BoardId).uuid().not_null())
                    .col(ColumnDef::new(PipelinePositions::Stage).string().not_null())
                    .col(
                        ColumnDef::new(PipelinePositions::MovedByUser)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PipelinePositions::MovedAt)
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
                    .name("idx_pipeline_positions_account_lead")
                    .table(PipelinePositions::Table)
                    .col(PipelinePositions::AccountId)
                    .col(PipelinePositions::LeadId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PipelinePositions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PipelineBoards::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Dispositions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Dispositions {
    Table,
    Id,
    AccountId,
    Name,
    PipelineStage,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum PipelineBoards {
    Table,
    Id,
    AccountId,
    Name,
    NormalizedName,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum PipelinePositions {
    Table,
    Id,
    AccountId,
    LeadId,
    BoardId,
    Stage,
    MovedByUser,
    MovedAt,
}
