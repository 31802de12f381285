use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::investment;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum PackageType {
  #[sea_orm(string_value = "starter")]
  #[default]
  Starter,
  #[sea_orm(string_value = "growth")]
  Growth,
  #[sea_orm(string_value = "premium")]
  Premium,
  #[sea_orm(string_value = "elite")]
  Elite,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "packages")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub name: String,
  pub package_type: PackageType,
  pub price: i64,
  pub daily_earning: i64,
  pub duration_days: i32,
  /// JSON array of marketing bullet points
  pub features: Option<String>,
  pub is_active: bool,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "investment::Entity")]
  Investments,
}

impl Related<investment::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Investments.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
