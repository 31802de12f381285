use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{daily_commission, package, profile};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum InvestmentStatus {
  #[sea_orm(string_value = "active")]
  #[default]
  Active,
  #[sea_orm(string_value = "completed")]
  Completed,
  #[sea_orm(string_value = "suspended")]
  Suspended,
}

/// Amount and daily earning are copied from the package at purchase time;
/// later package edits never touch existing investments.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "investments")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub user_id: Uuid,
  pub package_id: i32,
  pub amount: i64,
  pub daily_earning: i64,
  pub status: InvestmentStatus,
  pub days_completed: i32,
  pub total_earned: i64,
  pub start_date: DateTime,
  pub end_date: DateTime,
  pub created_at: DateTime,
}

impl Model {
  /// Term length in days, fixed by the start/end dates written at purchase.
  pub fn duration_days(&self) -> i32 {
    (self.end_date - self.start_date).num_days() as i32
  }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "profile::Entity",
    from = "Column::UserId",
    to = "profile::Column::Id"
  )]
  Owner,
  #[sea_orm(
    belongs_to = "package::Entity",
    from = "Column::PackageId",
    to = "package::Column::Id"
  )]
  Package,
  #[sea_orm(has_many = "daily_commission::Entity")]
  DailyCommissions,
}

impl Related<profile::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Owner.def()
  }
}

impl Related<package::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Package.def()
  }
}

impl Related<daily_commission::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::DailyCommissions.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
