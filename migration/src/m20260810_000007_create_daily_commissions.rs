use sea_orm_migration::prelude::*;

use super::{
  m20260810_000001_create_profiles::Profiles,
  m20260810_000003_create_investments::Investments,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(DailyCommissions::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(DailyCommissions::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(DailyCommissions::InvestmentId)
              .integer()
              .not_null(),
          )
          .col(ColumnDef::new(DailyCommissions::UserId).uuid().not_null())
          .col(ColumnDef::new(DailyCommissions::DayNumber).integer().not_null())
          .col(
            ColumnDef::new(DailyCommissions::Amount).big_integer().not_null(),
          )
          .col(
            ColumnDef::new(DailyCommissions::CommissionDate).date().not_null(),
          )
          .col(
            ColumnDef::new(DailyCommissions::CreatedAt).date_time().not_null(),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_daily_commissions_investment")
              .from(DailyCommissions::Table, DailyCommissions::InvestmentId)
              .to(Investments::Table, Investments::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_daily_commissions_user")
              .from(DailyCommissions::Table, DailyCommissions::UserId)
              .to(Profiles::Table, Profiles::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    // Accrual idempotency key
    manager
      .create_index(
        Index::create()
          .name("idx_daily_commissions_day")
          .table(DailyCommissions::Table)
          .col(DailyCommissions::InvestmentId)
          .col(DailyCommissions::DayNumber)
          .unique()
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(DailyCommissions::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum DailyCommissions {
  Table,
  Id,
  InvestmentId,
  UserId,
  DayNumber,
  Amount,
  CommissionDate,
  CreatedAt,
}
