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
          .table(Referrals::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Referrals::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Referrals::ReferrerId).uuid().not_null())
          .col(ColumnDef::new(Referrals::ReferredId).uuid().not_null())
          .col(ColumnDef::new(Referrals::BonusAmount).big_integer().not_null())
          .col(ColumnDef::new(Referrals::ReferralCode).string().not_null())
          .col(ColumnDef::new(Referrals::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_referrals_referrer")
              .from(Referrals::Table, Referrals::ReferrerId)
              .to(Profiles::Table, Profiles::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    // One bonus per (referrer, referred) pair
    manager
      .create_index(
        Index::create()
          .name("idx_referrals_pair")
          .table(Referrals::Table)
          .col(Referrals::ReferrerId)
          .col(Referrals::ReferredId)
          .unique()
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Referrals::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Referrals {
  Table,
  Id,
  ReferrerId,
  ReferredId,
  BonusAmount,
  ReferralCode,
  CreatedAt,
}
