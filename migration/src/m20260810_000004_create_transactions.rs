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
          .table(Transactions::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Transactions::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Transactions::UserId).uuid().not_null())
          .col(ColumnDef::new(Transactions::TxType).string().not_null())
          .col(ColumnDef::new(Transactions::Amount).big_integer().not_null())
          .col(
            ColumnDef::new(Transactions::Status)
              .string()
              .not_null()
              .default("completed"),
          )
          .col(ColumnDef::new(Transactions::PaymentMethod).string().null())
          .col(ColumnDef::new(Transactions::PhoneNumber).string().null())
          .col(ColumnDef::new(Transactions::Description).string().null())
          .col(ColumnDef::new(Transactions::ReferenceId).string().null())
          .col(ColumnDef::new(Transactions::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(Transactions::CompletedAt).date_time().null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_transactions_user")
              .from(Transactions::Table, Transactions::UserId)
              .to(Profiles::Table, Profiles::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_transactions_user")
          .table(Transactions::Table)
          .col(Transactions::UserId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Transactions::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum Transactions {
  Table,
  Id,
  UserId,
  TxType,
  Amount,
  Status,
  PaymentMethod,
  PhoneNumber,
  Description,
  ReferenceId,
  CreatedAt,
  CompletedAt,
}
