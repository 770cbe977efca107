//! Create offerings table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Offerings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Offerings::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Offerings::Title).string().not_null())
                    .col(
                        ColumnDef::new(Offerings::Price)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Offerings::Capacity).big_integer().not_null())
                    .col(
                        ColumnDef::new(Offerings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Offerings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Offerings {
    Table,
    Id,
    Title,
    Price,
    Capacity,
    CreatedAt,
}
