//! Create reservations table
//!
//! The order ledger. Rows are only ever inserted, or deleted all at once by
//! an administrative reset.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_offerings::Offerings;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reservations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reservations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reservations::OfferingId).string().not_null())
                    .col(ColumnDef::new(Reservations::RequesterId).string().not_null())
                    .col(
                        ColumnDef::new(Reservations::Status)
                            .string()
                            .not_null()
                            .default("COMMITTED"),
                    )
                    .col(ColumnDef::new(Reservations::HolderKey).string())
                    .col(
                        ColumnDef::new(Reservations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_offering")
                            .from(Reservations::Table, Reservations::OfferingId)
                            .to(Offerings::Table, Offerings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_offering")
                    .table(Reservations::Table)
                    .col(Reservations::OfferingId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_holder_key")
                    .table(Reservations::Table)
                    .col(Reservations::HolderKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_created_at")
                    .table(Reservations::Table)
                    .col(Reservations::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reservations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Reservations {
    Table,
    Id,
    OfferingId,
    RequesterId,
    Status,
    HolderKey,
    CreatedAt,
}
