use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{investment, profile};

/// Audit row for one accrual day of one investment. The (investment_id,
/// day_number) pair is unique, which is what makes the daily batch safe to
/// re-run.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_commissions")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub investment_id: i32,
  pub user_id: Uuid,
  /// 1-based, up to the investment's term length
  pub day_number: i32,
  pub amount: i64,
  pub commission_date: Date,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "investment::Entity",
    from = "Column::InvestmentId",
    to = "investment::Column::Id"
  )]
  Investment,
  #[sea_orm(
    belongs_to = "profile::Entity",
    from = "Column::UserId",
    to = "profile::Column::Id"
  )]
  User,
}

impl Related<investment::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Investment.def()
  }
}

impl Related<profile::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::User.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
