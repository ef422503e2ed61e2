//! Create resources table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Resources::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Resources::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Resources::Kind)
                            .string()
                            .not_null()
                            .default("parking_space"),
                    )
                    .col(ColumnDef::new(Resources::Name).string())
                    .col(ColumnDef::new(Resources::X).double().not_null())
                    .col(ColumnDef::new(Resources::Y).double().not_null())
                    .col(
                        ColumnDef::new(Resources::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Resources::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Resources {
    Table,
    Id,
    Kind,
    Name,
    X,
    Y,
    CreatedAt,
}
