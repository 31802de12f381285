use sea_orm_migration::prelude::*;

use super::{
  m20260810_000001_create_profiles::Profiles,
  m20260810_000004_create_transactions::Transactions,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(PendingPayments::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(PendingPayments::CheckoutRequestId)
              .string()
              .not_null()
              .primary_key(),
          )
          .col(
            ColumnDef::new(PendingPayments::TransactionId)
              .integer()
              .not_null(),
          )
          .col(ColumnDef::new(PendingPayments::UserId).uuid().not_null())
          .col(
            ColumnDef::new(PendingPayments::Amount).big_integer().not_null(),
          )
          .col(ColumnDef::new(PendingPayments::Phone).string().not_null())
          .col(
            ColumnDef::new(PendingPayments::State)
              .string()
              .not_null()
              .default("initiated"),
          )
          .col(
            ColumnDef::new(PendingPayments::CreatedAt).date_time().not_null(),
          )
          .col(
            ColumnDef::new(PendingPayments::ExpiresAt).date_time().not_null(),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_pending_payments_user")
              .from(PendingPayments::Table, PendingPayments::UserId)
              .to(Profiles::Table, Profiles::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_pending_payments_transaction")
              .from(PendingPayments::Table, PendingPayments::TransactionId)
              .to(Transactions::Table, Transactions::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_pending_payments_user")
          .table(PendingPayments::Table)
          .col(PendingPayments::UserId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(PendingPayments::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum PendingPayments {
  Table,
  CheckoutRequestId,
  TransactionId,
  UserId,
  Amount,
  Phone,
  State,
  CreatedAt,
  ExpiresAt,
}
