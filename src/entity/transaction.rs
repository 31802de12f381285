use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::profile;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum TransactionType {
  #[sea_orm(string_value = "deposit")]
  #[default]
  Deposit,
  #[sea_orm(string_value = "withdrawal")]
  Withdrawal,
  #[sea_orm(string_value = "investment")]
  Investment,
  #[sea_orm(string_value = "commission")]
  Commission,
  #[sea_orm(string_value = "referral_bonus")]
  ReferralBonus,
  #[sea_orm(string_value = "admin_deposit")]
  AdminDeposit,
  #[sea_orm(string_value = "admin_withdrawal")]
  AdminWithdrawal,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum TransactionStatus {
  #[sea_orm(string_value = "pending")]
  Pending,
  #[sea_orm(string_value = "completed")]
  #[default]
  Completed,
  #[sea_orm(string_value = "failed")]
  Failed,
  #[sea_orm(string_value = "cancelled")]
  Cancelled,
}

/// Append-only ledger row. Nothing but `status`/`completed_at` is ever
/// updated after insert.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub user_id: Uuid,
  pub tx_type: TransactionType,
  /// Signed: credits positive, debits negative
  pub amount: i64,
  pub status: TransactionStatus,
  pub payment_method: Option<String>,
  pub phone_number: Option<String>,
  pub description: Option<String>,
  /// Provider reference or linked withdrawal/investment id
  pub reference_id: Option<String>,
  pub created_at: DateTime,
  pub completed_at: Option<DateTime>,
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
