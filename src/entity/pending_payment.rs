use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::profile;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum PaymentState {
  #[sea_orm(string_value = "initiated")]
  #[default]
  Initiated,
  #[sea_orm(string_value = "provider_pending")]
  ProviderPending,
}

/// Deposit awaiting provider confirmation. The row exists only while the
/// payment is in flight; the webhook (or expiry GC) removes it when the
/// linked transaction reaches a terminal status.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pending_payments")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub checkout_request_id: String,
  pub transaction_id: i32,
  pub user_id: Uuid,
  pub amount: i64,
  pub phone: String,
  pub state: PaymentState,
  pub created_at: DateTime,
  pub expires_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "profile::Entity",
    from = "Column::UserId",
    to = "profile::Column::Id"
  )]
  User,
}

impl Related<profile::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::User.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
