use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Packages::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Packages::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Packages::Name).string().not_null())
          .col(ColumnDef::new(Packages::PackageType).string().not_null())
          .col(ColumnDef::new(Packages::Price).big_integer().not_null())
          .col(ColumnDef::new(Packages::DailyEarning).big_integer().not_null())
          .col(ColumnDef::new(Packages::DurationDays).integer().not_null())
          .col(ColumnDef::new(Packages::Features).string().null())
          .col(
            ColumnDef::new(Packages::IsActive)
              .boolean()
              .not_null()
              .default(true),
          )
          .col(ColumnDef::new(Packages::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Packages::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Packages {
  Table,
  Id,
  Name,
  PackageType,
  Price,
  DailyEarning,
  DurationDays,
  Features,
  IsActive,
  CreatedAt,
}
