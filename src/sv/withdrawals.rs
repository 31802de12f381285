use crate::{
  entity::{
    TransactionType, WithdrawalStatus, profile, withdrawal,
  },
  prelude::*,
  sv::wallet::{KES, TxMeta, Wallet},
};

pub struct Withdrawals<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Withdrawals<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Client-side request. Funds are NOT reserved here; the live balance is
  /// re-validated when an operator approves.
  pub async fn request(
    &self,
    user_id: Uuid,
    amount: i64,
    phone: String,
    min_amount: i64,
  ) -> Result<withdrawal::Model> {
    if amount < min_amount {
      return Err(Error::InvalidAmount(format!(
        "minimum withdrawal is KES {}",
        min_amount / KES
      )));
    }

    profile::Entity::find_by_id(user_id)
      .one(self.db)
      .await?
      .ok_or(Error::ProfileNotFound)?;

    let now = Utc::now().naive_utc();

    Ok(
      withdrawal::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        amount: Set(amount),
        phone: Set(phone),
        status: Set(WithdrawalStatus::Pending),
        notes: Set(None),
        requested_at: Set(now),
        processed_at: Set(None),
        processed_by: Set(None),
      }
      .insert(self.db)
      .await?,
    )
  }

  /// Operator approval: the only trigger for the wallet debit. The balance
  /// may have been spent since request time, so the debit re-checks it; on
  /// `InsufficientBalance` the request stays pending for follow-up.
  pub async fn approve(
    &self,
    admin_id: Uuid,
    request_id: i32,
    notes: Option<String>,
  ) -> Result<withdrawal::Model> {
    let txn = self.db.begin().await?;

    let request = withdrawal::Entity::find_by_id(request_id)
      .one(&txn)
      .await?
      .ok_or(Error::WithdrawalNotFound)?;

    if request.status != WithdrawalStatus::Pending {
      return Err(Error::AlreadyProcessed);
    }

    Wallet::apply(
      &txn,
      request.user_id,
      -request.amount,
      TxMeta::of(TransactionType::Withdrawal)
        .method("mpesa")
        .phone(request.phone.clone())
        .describe(format!(
          "Withdrawal of KES {} to {}",
          request.amount / KES,
          request.phone
        ))
        .reference(format!("withdrawal:{}", request.id)),
    )
    .await?;

    let now = Utc::now().naive_utc();

    let updated = withdrawal::ActiveModel {
      status: Set(WithdrawalStatus::Approved),
      notes: Set(notes),
      processed_at: Set(Some(now)),
      processed_by: Set(Some(admin_id)),
      ..request.into()
    }
    .update(&txn)
    .await?;

    txn.commit().await?;
    Ok(updated)
  }

  pub async fn reject(
    &self,
    admin_id: Uuid,
    request_id: i32,
    notes: Option<String>,
  ) -> Result<withdrawal::Model> {
    let request = withdrawal::Entity::find_by_id(request_id)
      .one(self.db)
      .await?
      .ok_or(Error::WithdrawalNotFound)?;

    if request.status != WithdrawalStatus::Pending {
      return Err(Error::AlreadyProcessed);
    }

    let now = Utc::now().naive_utc();

    Ok(
      withdrawal::ActiveModel {
        status: Set(WithdrawalStatus::Rejected),
        notes: Set(notes),
        processed_at: Set(Some(now)),
        processed_by: Set(Some(admin_id)),
        ..request.into()
      }
      .update(self.db)
      .await?,
    )
  }

  pub async fn pending(&self) -> Result<Vec<withdrawal::Model>> {
    Ok(
      withdrawal::Entity::find()
        .filter(withdrawal::Column::Status.eq(WithdrawalStatus::Pending))
        .order_by_desc(withdrawal::Column::RequestedAt)
        .all(self.db)
        .await?,
    )
  }

  pub async fn by_user(
    &self,
    user_id: Uuid,
  ) -> Result<Vec<withdrawal::Model>> {
    Ok(
      withdrawal::Entity::find()
        .filter(withdrawal::Column::UserId.eq(user_id))
        .order_by_desc(withdrawal::Column::RequestedAt)
        .all(self.db)
        .await?,
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    entity::TransactionStatus,
    sv::test_utils::test_db,
  };

  const MIN: i64 = 100 * KES;

  #[tokio::test]
  async fn test_request_below_minimum_is_rejected() {
    let db = test_db::setup().await;
    let user = test_db::client(&db, 1000 * KES).await;

    let result = Withdrawals::new(&db)
      .request(user, 50 * KES, "254712345678".into(), MIN)
      .await;

    assert!(matches!(result, Err(Error::InvalidAmount(_))));
  }

  #[tokio::test]
  async fn test_request_does_not_touch_wallet() {
    let db = test_db::setup().await;
    let user = test_db::client(&db, 1000 * KES).await;

    let request = Withdrawals::new(&db)
      .request(user, 500 * KES, "254712345678".into(), MIN)
      .await
      .unwrap();

    assert_eq!(request.status, WithdrawalStatus::Pending);
    assert_eq!(Wallet::new(&db).balance(user).await.unwrap(), 1000 * KES);
  }

  #[tokio::test]
  async fn test_approval_debits_and_records_transaction() {
    let db = test_db::setup().await;
    let user = test_db::client(&db, 1000 * KES).await;
    let admin = test_db::admin(&db).await;

    let withdrawals = Withdrawals::new(&db);
    let request = withdrawals
      .request(user, 500 * KES, "254712345678".into(), MIN)
      .await
      .unwrap();

    let approved =
      withdrawals.approve(admin, request.id, Some("ok".into())).await.unwrap();

    assert_eq!(approved.status, WithdrawalStatus::Approved);
    assert_eq!(approved.processed_by, Some(admin));
    assert!(approved.processed_at.is_some());
    assert_eq!(Wallet::new(&db).balance(user).await.unwrap(), 500 * KES);

    let txs = Wallet::new(&db).transactions(user, 10).await.unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].tx_type, TransactionType::Withdrawal);
    assert_eq!(txs[0].amount, -500 * KES);
    assert_eq!(txs[0].status, TransactionStatus::Completed);
    assert_eq!(
      txs[0].reference_id.as_deref(),
      Some(format!("withdrawal:{}", request.id).as_str())
    );
  }

  #[tokio::test]
  async fn test_stale_request_fails_approval_and_stays_pending() {
    let db = test_db::setup().await;
    let user = test_db::client(&db, 50 * KES).await;
    let admin = test_db::admin(&db).await;

    let withdrawals = Withdrawals::new(&db);
    // Balance was sufficient once; pretend it was spent since
    let request = withdrawals
      .request(user, 100 * KES, "254712345678".into(), MIN)
      .await
      .unwrap();

    let result = withdrawals.approve(admin, request.id, None).await;
    assert!(matches!(result, Err(Error::InsufficientBalance)));

    let reloaded = withdrawal::Entity::find_by_id(request.id)
      .one(&db)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(reloaded.status, WithdrawalStatus::Pending);
    assert_eq!(Wallet::new(&db).balance(user).await.unwrap(), 50 * KES);
  }

  #[tokio::test]
  async fn test_double_approval_debits_once() {
    let db = test_db::setup().await;
    let user = test_db::client(&db, 1000 * KES).await;
    let admin = test_db::admin(&db).await;

    let withdrawals = Withdrawals::new(&db);
    let request = withdrawals
      .request(user, 500 * KES, "254712345678".into(), MIN)
      .await
      .unwrap();

    withdrawals.approve(admin, request.id, None).await.unwrap();
    let again = withdrawals.approve(admin, request.id, None).await;

    assert!(matches!(again, Err(Error::AlreadyProcessed)));
    assert_eq!(Wallet::new(&db).balance(user).await.unwrap(), 500 * KES);
  }

  #[tokio::test]
  async fn test_reject_is_terminal_and_leaves_wallet_alone() {
    let db = test_db::setup().await;
    let user = test_db::client(&db, 1000 * KES).await;
    let admin = test_db::admin(&db).await;

    let withdrawals = Withdrawals::new(&db);
    let request = withdrawals
      .request(user, 500 * KES, "254712345678".into(), MIN)
      .await
      .unwrap();

    let rejected = withdrawals
      .reject(admin, request.id, Some("suspicious".into()))
      .await
      .unwrap();
    assert_eq!(rejected.status, WithdrawalStatus::Rejected);
    assert_eq!(Wallet::new(&db).balance(user).await.unwrap(), 1000 * KES);

    let approve_after = withdrawals.approve(admin, request.id, None).await;
    assert!(matches!(approve_after, Err(Error::AlreadyProcessed)));
  }
}
