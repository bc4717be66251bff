use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Leads::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Leads::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Leads::AccountId).uuid().not_null())
                    .col(ColumnDef::new(Leads::Phone).string().not_null())
                    .col(
                        ColumnDef::new(Leads::Status)
                            .string()
                            .not_null()
                            .default("new"),
                    )
                    .col(
                        ColumnDef::new(Leads::DoNotContact)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Leads::NextCallbackAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Leads::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Leads::UpdatedAt)
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
                    .table(DoNotContactRegistry::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DoNotContactRegistry::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DoNotContactRegistry::AccountId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DoNotContactRegistry::PhoneNumber)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DoNotContactRegistry::Source).string())
                    .col(
                        ColumnDef::new(DoNotContactRegistry::CreatedAt)
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
                    .name("idx_dnc_account_phone")
                    .table(DoNotContactRegistry::Table)
                    .col(DoNotContactRegistry::AccountId)
                    .col(DoNotContactRegistry::PhoneNumber)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DoNotContactRegistry::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Leads::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Leads {
    Table,
    Id,
    AccountId,
    Phone,
    Status,
    DoNotContact,
    NextCallbackAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum DoNotContactRegistry {
    Table,
    Id,
    AccountId,
    PhoneNumber,
    Source,
    CreatedAt,
}
