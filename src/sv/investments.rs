use crate::{
  entity::{
    InvestmentStatus, TransactionType, investment, package, profile,
  },
  prelude::*,
  sv::{
    Referrals,
    wallet::{TxMeta, Wallet},
  },
};

pub struct Investments<'a> {
  db: &'a DatabaseConnection,
}

#[derive(Debug, Default, serde::Serialize)]
pub struct InvestmentStats {
  pub total_invested: i64,
  pub total_earned: i64,
  pub active_count: u64,
  /// Combined daily rate of all active investments
  pub daily_earning: i64,
}

impl<'a> Investments<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Purchase: a single synchronous transfer of already-deposited funds.
  /// Debits the wallet, creates the investment with terms copied from the
  /// package, and fires the referral bonus if this is the referred user's
  /// first investment, all in one transaction.
  pub async fn invest(
    &self,
    user_id: Uuid,
    package_id: i32,
    referral_percent: i64,
  ) -> Result<investment::Model> {
    let txn = self.db.begin().await?;

    let package = package::Entity::find_by_id(package_id)
      .one(&txn)
      .await?
      .ok_or(Error::PackageNotFound)?;

    if !package.is_active {
      return Err(Error::PackageInactive);
    }

    Wallet::apply(
      &txn,
      user_id,
      -package.price,
      TxMeta::of(TransactionType::Investment)
        .describe(format!("Investment in {}", package.name))
        .reference(format!("package:{}", package.id)),
    )
    .await?;

    let now = Utc::now().naive_utc();
    let end = now + TimeDelta::days(package.duration_days as i64);

    let investment = investment::ActiveModel {
      id: NotSet,
      user_id: Set(user_id),
      package_id: Set(package.id),
      amount: Set(package.price),
      daily_earning: Set(package.daily_earning),
      status: Set(InvestmentStatus::Active),
      days_completed: Set(0),
      total_earned: Set(0),
      start_date: Set(now),
      end_date: Set(end),
      created_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let profile = profile::Entity::find_by_id(user_id)
      .one(&txn)
      .await?
      .ok_or(Error::ProfileNotFound)?;

    if let Some(referrer_id) = profile.referred_by {
      match Referrals::record_bonus(
        &txn,
        referrer_id,
        user_id,
        package.price,
        referral_percent,
      )
      .await
      {
        Ok(row) => {
          info!(
            "referral bonus of {} credited to {} for {}",
            row.bonus_amount, referrer_id, user_id
          );
        }
        // Not the first investment; the bonus already fired
        Err(Error::AlreadyProcessed) => {}
        Err(err) => return Err(err),
      }
    }

    txn.commit().await?;
    Ok(investment)
  }

  pub async fn get(&self, id: i32) -> Result<investment::Model> {
    investment::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::InvestmentNotFound)
  }

  pub async fn by_user(&self, user_id: Uuid) -> Result<Vec<investment::Model>> {
    Ok(
      investment::Entity::find()
        .filter(investment::Column::UserId.eq(user_id))
        .order_by_desc(investment::Column::CreatedAt)
        .all(self.db)
        .await?,
    )
  }

  pub async fn stats(&self, user_id: Uuid) -> Result<InvestmentStats> {
    let investments = self.by_user(user_id).await?;

    let mut stats = InvestmentStats::default();
    for inv in &investments {
      stats.total_invested += inv.amount;
      stats.total_earned += inv.total_earned;
      if inv.status == InvestmentStatus::Active {
        stats.active_count += 1;
        stats.daily_earning += inv.daily_earning;
      }
    }

    Ok(stats)
  }

  pub async fn suspend(&self, id: i32) -> Result<()> {
    self.set_status(id, InvestmentStatus::Active, InvestmentStatus::Suspended)
      .await
  }

  pub async fn resume(&self, id: i32) -> Result<()> {
    self.set_status(id, InvestmentStatus::Suspended, InvestmentStatus::Active)
      .await
  }

  async fn set_status(
    &self,
    id: i32,
    from: InvestmentStatus,
    to: InvestmentStatus,
  ) -> Result<()> {
    let investment = self.get(id).await?;

    if investment.status != from {
      return Err(Error::InvalidArgs(format!(
        "investment {id} is not {from:?}"
      )));
    }

    investment::ActiveModel { status: Set(to), ..investment.into() }
      .update(self.db)
      .await?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::{test_utils::test_db, wallet::KES};

  #[tokio::test]
  async fn test_invest_debits_and_creates_record() {
    let db = test_db::setup().await;
    let user = test_db::client(&db, 5000 * KES).await;
    let pkg = test_db::package(&db, 5000 * KES, 500 * KES, 10).await;

    let inv = Investments::new(&db).invest(user, pkg, 10).await.unwrap();

    assert_eq!(inv.amount, 5000 * KES);
    assert_eq!(inv.daily_earning, 500 * KES);
    assert_eq!(inv.status, InvestmentStatus::Active);
    assert_eq!(inv.days_completed, 0);
    assert_eq!(inv.total_earned, 0);
    assert_eq!(inv.duration_days(), 10);

    assert_eq!(Wallet::new(&db).balance(user).await.unwrap(), 0);

    let txs = Wallet::new(&db).transactions(user, 10).await.unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].tx_type, TransactionType::Investment);
    assert_eq!(txs[0].amount, -5000 * KES);
  }

  #[tokio::test]
  async fn test_invest_with_insufficient_balance_changes_nothing() {
    let db = test_db::setup().await;
    let user = test_db::client(&db, 1000 * KES).await;
    let pkg = test_db::package(&db, 5000 * KES, 500 * KES, 10).await;

    let result = Investments::new(&db).invest(user, pkg, 10).await;
    assert!(matches!(result, Err(Error::InsufficientBalance)));

    assert_eq!(Wallet::new(&db).balance(user).await.unwrap(), 1000 * KES);
    assert!(Investments::new(&db).by_user(user).await.unwrap().is_empty());
    assert!(Wallet::new(&db).transactions(user, 10).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_invest_in_inactive_package_is_rejected() {
    let db = test_db::setup().await;
    let user = test_db::client(&db, 5000 * KES).await;
    let pkg = test_db::package(&db, 5000 * KES, 500 * KES, 10).await;

    crate::sv::Catalog::new(&db).deactivate(pkg).await.unwrap();

    let result = Investments::new(&db).invest(user, pkg, 10).await;
    assert!(matches!(result, Err(Error::PackageInactive)));
  }

  #[tokio::test]
  async fn test_first_investment_pays_referrer_once() {
    let db = test_db::setup().await;
    let referrer = test_db::client(&db, 0).await;
    let referred = test_db::referred_client(&db, 10000 * KES, referrer).await;
    let pkg = test_db::package(&db, 5000 * KES, 500 * KES, 10).await;

    let investments = Investments::new(&db);
    investments.invest(referred, pkg, 10).await.unwrap();

    // 10% of 5000
    assert_eq!(Wallet::new(&db).balance(referrer).await.unwrap(), 500 * KES);

    // Second purchase pays nothing extra
    investments.invest(referred, pkg, 10).await.unwrap();
    assert_eq!(Wallet::new(&db).balance(referrer).await.unwrap(), 500 * KES);

    let stats = Referrals::new(&db).stats(referrer).await.unwrap();
    assert_eq!(stats.total_referrals, 1);
  }

  #[tokio::test]
  async fn test_stats_aggregate_active_investments() {
    let db = test_db::setup().await;
    let user = test_db::client(&db, 8000 * KES).await;
    let small = test_db::package(&db, 3000 * KES, 300 * KES, 10).await;
    let large = test_db::package(&db, 5000 * KES, 500 * KES, 20).await;

    let investments = Investments::new(&db);
    investments.invest(user, small, 10).await.unwrap();
    let second = investments.invest(user, large, 10).await.unwrap();
    investments.suspend(second.id).await.unwrap();

    let stats = investments.stats(user).await.unwrap();
    assert_eq!(stats.total_invested, 8000 * KES);
    assert_eq!(stats.active_count, 1);
    assert_eq!(stats.daily_earning, 300 * KES);
  }

  #[tokio::test]
  async fn test_suspend_and_resume() {
    let db = test_db::setup().await;
    let user = test_db::client(&db, 5000 * KES).await;
    let pkg = test_db::package(&db, 5000 * KES, 500 * KES, 10).await;

    let investments = Investments::new(&db);
    let inv = investments.invest(user, pkg, 10).await.unwrap();

    investments.suspend(inv.id).await.unwrap();
    assert!(matches!(
      investments.suspend(inv.id).await,
      Err(Error::InvalidArgs(_))
    ));

    investments.resume(inv.id).await.unwrap();
    assert_eq!(
      investments.get(inv.id).await.unwrap().status,
      InvestmentStatus::Active
    );
  }
}
