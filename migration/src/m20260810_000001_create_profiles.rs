use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Profiles::Table)
          .if_not_exists()
          .col(ColumnDef::new(Profiles::Id).uuid().not_null().primary_key())
          .col(ColumnDef::new(Profiles::FullName).string().null())
          .col(ColumnDef::new(Profiles::Phone).string().null())
          .col(
            ColumnDef::new(Profiles::Role)
              .string()
              .not_null()
              .default("client"),
          )
          .col(
            ColumnDef::new(Profiles::WalletBalance)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(Profiles::ReferralCode)
              .string()
              .not_null()
              .unique_key(),
          )
          .col(ColumnDef::new(Profiles::ReferredBy).uuid().null())
          .col(ColumnDef::new(Profiles::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_profiles_referral_code")
          .table(Profiles::Table)
          .col(Profiles::ReferralCode)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Profiles::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Profiles {
  Table,
  Id,
  FullName,
  Phone,
  Role,
  WalletBalance,
  ReferralCode,
  ReferredBy,
  CreatedAt,
}
