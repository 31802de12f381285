use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{investment, transaction, withdrawal};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum UserRole {
  #[sea_orm(string_value = "admin")]
  Admin,
  #[sea_orm(string_value = "client")]
  #[default]
  Client,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: Uuid,
  pub full_name: Option<String>,
  pub phone: Option<String>,
  pub role: UserRole,
  /// KES cents; never negative (every mutation goes through the wallet path)
  pub wallet_balance: i64,
  #[sea_orm(unique)]
  pub referral_code: String,
  pub referred_by: Option<Uuid>,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "investment::Entity")]
  Investments,
  #[sea_orm(has_many = "transaction::Entity")]
  Transactions,
  #[sea_orm(has_many = "withdrawal::Entity")]
  Withdrawals,
}

impl Related<investment::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Investments.def()
  }
}

impl Related<transaction::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Transactions.def()
  }
}

impl Related<withdrawal::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Withdrawals.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
