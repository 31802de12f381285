use sea_orm_migration::prelude::*;

use super::m20260810_000001_create_profiles::Profiles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Withdrawals::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Withdrawals::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Withdrawals::UserId).uuid().not_null())
          .col(ColumnDef::new(Withdrawals::Amount).big_integer().not_null())
          .col(ColumnDef::new(Withdrawals::Phone).string().not_null())
          .col(
            ColumnDef::new(Withdrawals::Status)
              .string()
              .not_null()
              .default("pending"),
          )
          .col(ColumnDef::new(Withdrawals::Notes).string().null())
          .col(ColumnDef::new(Withdrawals::RequestedAt).date_time().not_null())
          .col(ColumnDef::new(Withdrawals::ProcessedAt).date_time().null())
          .col(ColumnDef::new(Withdrawals::ProcessedBy).uuid().null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_withdrawals_user")
              .from(Withdrawals::Table, Withdrawals::UserId)
              .to(Profiles::Table, Profiles::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_withdrawals_status")
          .table(Withdrawals::Table)
          .col(Withdrawals::Status)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Withdrawals::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum Withdrawals {
  Table,
  Id,
  UserId,
  Amount,
  Phone,
  Status,
  Notes,
  RequestedAt,
  ProcessedAt,
  ProcessedBy,
}
