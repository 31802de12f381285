use serde::Serialize;

use crate::{
  entity::{
    InvestmentStatus, TransactionStatus, TransactionType, UserRole,
    WithdrawalStatus, investment, profile, transaction, withdrawal,
  },
  prelude::*,
};

/// Platform-wide figures for the admin dashboard. All sums in KES cents.
#[derive(Debug, Default, Serialize)]
pub struct FinancialSummary {
  pub total_clients: u64,
  pub total_wallet_balance: i64,
  pub total_invested: i64,
  pub total_earned: i64,
  pub active_investments: u64,
  pub total_deposited: i64,
  pub total_withdrawn: i64,
  pub pending_withdrawals: u64,
  pub pending_withdrawal_amount: i64,
}

pub struct Summary<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Summary<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn financial(&self) -> Result<FinancialSummary> {
    use sea_orm::sea_query::Expr;

    let total_clients = profile::Entity::find()
      .filter(profile::Column::Role.eq(UserRole::Client))
      .count(self.db)
      .await?;

    let total_wallet_balance: Option<i64> = profile::Entity::find()
      .select_only()
      .column_as(Expr::col(profile::Column::WalletBalance).sum(), "balance")
      .into_tuple()
      .one(self.db)
      .await?
      .flatten();

    type InvestmentRow = (Option<i64>, Option<i64>);
    let invested: Option<InvestmentRow> = investment::Entity::find()
      .select_only()
      .column_as(Expr::col(investment::Column::Amount).sum(), "invested")
      .column_as(Expr::col(investment::Column::TotalEarned).sum(), "earned")
      .into_tuple()
      .one(self.db)
      .await?;

    let active_investments = investment::Entity::find()
      .filter(investment::Column::Status.eq(InvestmentStatus::Active))
      .count(self.db)
      .await?;

    let total_deposited =
      self.completed_volume(TransactionType::Deposit).await?;
    let total_withdrawn =
      -self.completed_volume(TransactionType::Withdrawal).await?;

    let pending_withdrawals = withdrawal::Entity::find()
      .filter(withdrawal::Column::Status.eq(WithdrawalStatus::Pending))
      .count(self.db)
      .await?;

    let pending_withdrawal_amount: Option<i64> = withdrawal::Entity::find()
      .select_only()
      .column_as(Expr::col(withdrawal::Column::Amount).sum(), "amount")
      .filter(withdrawal::Column::Status.eq(WithdrawalStatus::Pending))
      .into_tuple()
      .one(self.db)
      .await?
      .flatten();

    Ok(FinancialSummary {
      total_clients,
      total_wallet_balance: total_wallet_balance.unwrap_or(0),
      total_invested: invested.and_then(|r| r.0).unwrap_or(0),
      total_earned: invested.and_then(|r| r.1).unwrap_or(0),
      active_investments,
      total_deposited,
      total_withdrawn,
      pending_withdrawals,
      pending_withdrawal_amount: pending_withdrawal_amount.unwrap_or(0),
    })
  }

  async fn completed_volume(&self, tx_type: TransactionType) -> Result<i64> {
    use sea_orm::sea_query::Expr;

    let sum: Option<i64> = transaction::Entity::find()
      .select_only()
      .column_as(Expr::col(transaction::Column::Amount).sum(), "amount")
      .filter(transaction::Column::TxType.eq(tx_type))
      .filter(transaction::Column::Status.eq(TransactionStatus::Completed))
      .into_tuple()
      .one(self.db)
      .await?
      .flatten();

    Ok(sum.unwrap_or(0))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::{
    Investments, Payments, Withdrawals, test_utils::test_db, wallet::KES,
  };

  #[tokio::test]
  async fn test_empty_platform() {
    let db = test_db::setup().await;

    let summary = Summary::new(&db).financial().await.unwrap();
    assert_eq!(summary.total_clients, 0);
    assert_eq!(summary.total_wallet_balance, 0);
    assert_eq!(summary.total_invested, 0);
  }

  #[tokio::test]
  async fn test_summary_tracks_activity() {
    let db = test_db::setup().await;
    let admin = test_db::admin(&db).await;
    let alice = test_db::client(&db, 0).await;
    let bob = test_db::client(&db, 2000 * KES).await;
    let pkg = test_db::package(&db, 5000 * KES, 500 * KES, 10).await;

    // Alice deposits 10_000 via a confirmed payment
    let payments = Payments::new(&db);
    let tx = payments
      .begin_deposit(alice, 10000 * KES, "254712345678")
      .await
      .unwrap();
    payments.track("ws_CO_1", &tx, TimeDelta::minutes(60)).await.unwrap();
    payments.complete("ws_CO_1", true, None).await.unwrap();

    Investments::new(&db).invest(alice, pkg, 10).await.unwrap();

    // Bob requests a withdrawal, admin approves half of his balance
    let withdrawals = Withdrawals::new(&db);
    let request = withdrawals
      .request(bob, 1000 * KES, "254700000000".into(), 100 * KES)
      .await
      .unwrap();
    withdrawals.approve(admin, request.id, None).await.unwrap();
    withdrawals
      .request(bob, 500 * KES, "254700000000".into(), 100 * KES)
      .await
      .unwrap();

    let summary = Summary::new(&db).financial().await.unwrap();
    assert_eq!(summary.total_clients, 2);
    // Alice: 10000 in, 5000 invested; Bob: 2000 seed, 1000 out
    assert_eq!(summary.total_wallet_balance, 6000 * KES);
    assert_eq!(summary.total_invested, 5000 * KES);
    assert_eq!(summary.active_investments, 1);
    assert_eq!(summary.total_deposited, 10000 * KES);
    assert_eq!(summary.total_withdrawn, 1000 * KES);
    assert_eq!(summary.pending_withdrawals, 1);
    assert_eq!(summary.pending_withdrawal_amount, 500 * KES);
  }
}
