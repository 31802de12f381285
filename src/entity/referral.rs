use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::profile;

/// One row per (referrer, referred) pair, written together with the bonus
/// credit. Immutable after insert.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "referrals")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub referrer_id: Uuid,
  pub referred_id: Uuid,
  pub bonus_amount: i64,
  pub referral_code: String,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "profile::Entity",
    from = "Column::ReferrerId",
    to = "profile::Column::Id"
  )]
  Referrer,
}

impl Related<profile::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Referrer.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
