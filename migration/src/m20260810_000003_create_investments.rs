use sea_orm_migration::prelude::*;

use super::{
  m20260810_000001_create_profiles::Profiles,
  m20260810_000002_create_packages::Packages,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Investments::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Investments::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Investments::UserId).uuid().not_null())
          .col(ColumnDef::new(Investments::PackageId).integer().not_null())
          .col(ColumnDef::new(Investments::Amount).big_integer().not_null())
          .col(
            ColumnDef::new(Investments::DailyEarning)
              .big_integer()
              .not_null(),
          )
          .col(
            ColumnDef::new(Investments::Status)
              .string()
              .not_null()
              .default("active"),
          )
          .col(
            ColumnDef::new(Investments::DaysCompleted)
              .integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(Investments::TotalEarned)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(ColumnDef::new(Investments::StartDate).date_time().not_null())
          .col(ColumnDef::new(Investments::EndDate).date_time().not_null())
          .col(ColumnDef::new(Investments::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_investments_user")
              .from(Investments::Table, Investments::UserId)
              .to(Profiles::Table, Profiles::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_investments_package")
              .from(Investments::Table, Investments::PackageId)
              .to(Packages::Table, Packages::Id),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_investments_user")
          .table(Investments::Table)
          .col(Investments::UserId)
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_investments_status")
          .table(Investments::Table)
          .col(Investments::Status)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Investments::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum Investments {
  Table,
  Id,
  UserId,
  PackageId,
  Amount,
  DailyEarning,
  Status,
  DaysCompleted,
  TotalEarned,
  StartDate,
  EndDate,
  CreatedAt,
}
