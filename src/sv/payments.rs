use crate::{
  entity::{
    PaymentState, TransactionStatus, TransactionType, pending_payment,
    transaction,
  },
  prelude::*,
  sv::wallet::{KES, TxMeta, Wallet},
};

/// Mobile-money deposits. A deposit starts as a pending ledger row plus a
/// `pending_payments` tracker keyed by the provider's checkout request id;
/// the webhook (or expiry GC) resolves both.
pub struct Payments<'a> {
  db: &'a DatabaseConnection,
}

#[derive(Debug)]
pub enum Settlement {
  Credited { user_id: Uuid, amount: i64, balance: i64 },
  Failed { user_id: Uuid },
}

impl<'a> Payments<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Opens a deposit: writes the pending transaction before anything is
  /// sent to the provider, so every attempt is on the ledger.
  pub async fn begin_deposit(
    &self,
    user_id: Uuid,
    amount: i64,
    phone: &str,
  ) -> Result<transaction::Model> {
    Wallet::record_pending(
      self.db,
      user_id,
      amount,
      TxMeta::of(TransactionType::Deposit)
        .method("mpesa")
        .phone(phone)
        .describe(format!("M-Pesa deposit of KES {}", amount / KES)),
    )
    .await
  }

  /// Links the provider's checkout id to the pending transaction once the
  /// STK push is accepted.
  pub async fn track(
    &self,
    checkout_request_id: &str,
    tx: &transaction::Model,
    ttl: TimeDelta,
  ) -> Result<pending_payment::Model> {
    let txn = self.db.begin().await?;

    transaction::ActiveModel {
      reference_id: Set(Some(checkout_request_id.to_string())),
      ..tx.clone().into()
    }
    .update(&txn)
    .await?;

    let now = Utc::now().naive_utc();

    let pending = pending_payment::ActiveModel {
      checkout_request_id: Set(checkout_request_id.to_string()),
      transaction_id: Set(tx.id),
      user_id: Set(tx.user_id),
      amount: Set(tx.amount),
      phone: Set(tx.phone_number.clone().unwrap_or_default()),
      state: Set(PaymentState::ProviderPending),
      created_at: Set(now),
      expires_at: Set(now + ttl),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    Ok(pending)
  }

  /// Cancels a deposit whose STK push never went out. Nothing to track,
  /// the ledger row just closes.
  pub async fn abandon(&self, tx: transaction::Model) -> Result<()> {
    transaction::ActiveModel {
      status: Set(TransactionStatus::Cancelled),
      ..tx.into()
    }
    .update(self.db)
    .await?;

    Ok(())
  }

  /// Webhook resolution. Success settles the pending credit; failure marks
  /// it failed. Either way the tracker row is removed, so a replayed
  /// callback finds no pending payment and reports `AlreadyProcessed`.
  pub async fn complete(
    &self,
    checkout_request_id: &str,
    success: bool,
    receipt: Option<String>,
  ) -> Result<Settlement> {
    let Some(pending) = pending_payment::Entity::find_by_id(checkout_request_id)
      .one(self.db)
      .await?
    else {
      return self.classify_missing(checkout_request_id, receipt).await;
    };

    let txn = self.db.begin().await?;

    let settlement = if success {
      let (balance, settled) =
        Wallet::settle(&txn, pending.transaction_id, None).await?;

      if let Some(receipt) = receipt {
        transaction::ActiveModel {
          description: Set(Some(format!("M-Pesa deposit {receipt}"))),
          ..settled.into()
        }
        .update(&txn)
        .await?;
      }

      Settlement::Credited {
        user_id: pending.user_id,
        amount: pending.amount,
        balance,
      }
    } else {
      let tx = transaction::Entity::find_by_id(pending.transaction_id)
        .one(&txn)
        .await?
        .ok_or(Error::PaymentNotFound)?;

      transaction::ActiveModel {
        status: Set(TransactionStatus::Failed),
        ..tx.into()
      }
      .update(&txn)
      .await?;

      Settlement::Failed { user_id: pending.user_id }
    };

    pending_payment::Entity::delete_by_id(checkout_request_id)
      .exec(&txn)
      .await?;

    txn.commit().await?;
    Ok(settlement)
  }

  /// No tracker row: either this callback already landed or the checkout id
  /// was never ours. A resolved transaction still carries the checkout id
  /// in its reference.
  async fn classify_missing(
    &self,
    checkout_request_id: &str,
    receipt: Option<String>,
  ) -> Result<Settlement> {
    let mut refs = vec![checkout_request_id.to_string()];
    refs.extend(receipt);

    let resolved = transaction::Entity::find()
      .filter(transaction::Column::ReferenceId.is_in(refs))
      .one(self.db)
      .await?;

    match resolved {
      Some(_) => Err(Error::AlreadyProcessed),
      None => Err(Error::PaymentNotFound),
    }
  }

  /// GC for checkouts the provider never answered. Cancels the ledger row
  /// and drops the tracker.
  pub async fn expire_stale(&self, now: DateTime) -> Result<u64> {
    let stale = pending_payment::Entity::find()
      .filter(pending_payment::Column::ExpiresAt.lt(now))
      .all(self.db)
      .await?;

    let mut expired = 0;
    for pending in stale {
      let txn = self.db.begin().await?;

      let tx = transaction::Entity::find_by_id(pending.transaction_id)
        .one(&txn)
        .await?;

      if let Some(tx) = tx.filter(|t| t.status == TransactionStatus::Pending) {
        transaction::ActiveModel {
          status: Set(TransactionStatus::Cancelled),
          ..tx.into()
        }
        .update(&txn)
        .await?;
      }

      pending_payment::Entity::delete_by_id(pending.checkout_request_id.as_str())
        .exec(&txn)
        .await?;

      txn.commit().await?;
      expired += 1;

      warn!(
        "expired stale deposit {} for {}",
        pending.checkout_request_id, pending.user_id
      );
    }

    Ok(expired)
  }

  pub async fn pending_count(&self) -> Result<u64> {
    Ok(pending_payment::Entity::find().count(self.db).await?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test_utils::test_db;

  async fn tracked(
    db: &DatabaseConnection,
    user: Uuid,
    checkout: &str,
  ) -> transaction::Model {
    let payments = Payments::new(db);
    let tx = payments
      .begin_deposit(user, 1000 * KES, "254712345678")
      .await
      .unwrap();
    payments.track(checkout, &tx, TimeDelta::minutes(60)).await.unwrap();
    tx
  }

  #[tokio::test]
  async fn test_successful_deposit_credits_wallet() {
    let db = test_db::setup().await;
    let user = test_db::client(&db, 0).await;
    tracked(&db, user, "ws_CO_1").await;

    let payments = Payments::new(&db);
    let settlement = payments
      .complete("ws_CO_1", true, Some("NLJ7RT61SV".into()))
      .await
      .unwrap();

    assert!(matches!(
      settlement,
      Settlement::Credited { amount, balance, .. }
        if amount == 1000 * KES && balance == 1000 * KES
    ));
    assert_eq!(Wallet::new(&db).balance(user).await.unwrap(), 1000 * KES);
    assert_eq!(payments.pending_count().await.unwrap(), 0);

    let txs = Wallet::new(&db).transactions(user, 10).await.unwrap();
    assert_eq!(txs[0].status, TransactionStatus::Completed);
    assert_eq!(txs[0].reference_id.as_deref(), Some("ws_CO_1"));
  }

  #[tokio::test]
  async fn test_failed_deposit_credits_nothing() {
    let db = test_db::setup().await;
    let user = test_db::client(&db, 0).await;
    tracked(&db, user, "ws_CO_2").await;

    let settlement =
      Payments::new(&db).complete("ws_CO_2", false, None).await.unwrap();

    assert!(matches!(settlement, Settlement::Failed { .. }));
    assert_eq!(Wallet::new(&db).balance(user).await.unwrap(), 0);

    let txs = Wallet::new(&db).transactions(user, 10).await.unwrap();
    assert_eq!(txs[0].status, TransactionStatus::Failed);
  }

  #[tokio::test]
  async fn test_replayed_callback_is_flagged_not_recredited() {
    let db = test_db::setup().await;
    let user = test_db::client(&db, 0).await;
    tracked(&db, user, "ws_CO_3").await;

    let payments = Payments::new(&db);
    payments.complete("ws_CO_3", true, None).await.unwrap();

    let replay = payments.complete("ws_CO_3", true, None).await;
    assert!(matches!(replay, Err(Error::AlreadyProcessed)));
    assert_eq!(Wallet::new(&db).balance(user).await.unwrap(), 1000 * KES);
  }

  #[tokio::test]
  async fn test_unknown_checkout_id() {
    let db = test_db::setup().await;

    let result = Payments::new(&db).complete("ws_CO_nope", true, None).await;
    assert!(matches!(result, Err(Error::PaymentNotFound)));
  }

  #[tokio::test]
  async fn test_expiry_cancels_unanswered_checkout() {
    let db = test_db::setup().await;
    let user = test_db::client(&db, 0).await;
    tracked(&db, user, "ws_CO_4").await;

    let payments = Payments::new(&db);

    let before = Utc::now().naive_utc();
    assert_eq!(payments.expire_stale(before).await.unwrap(), 0);

    let after = before + TimeDelta::hours(2);
    assert_eq!(payments.expire_stale(after).await.unwrap(), 1);
    assert_eq!(payments.pending_count().await.unwrap(), 0);

    let txs = Wallet::new(&db).transactions(user, 10).await.unwrap();
    assert_eq!(txs[0].status, TransactionStatus::Cancelled);
    assert_eq!(Wallet::new(&db).balance(user).await.unwrap(), 0);

    // Late callback after expiry: checkout id is still on the ledger row
    let late = payments.complete("ws_CO_4", true, None).await;
    assert!(matches!(late, Err(Error::AlreadyProcessed)));
  }
}
