use crate::{
  entity::{TransactionStatus, TransactionType, profile, transaction},
  prelude::*,
};

/// 1 KES = 100 cents; all amounts in the system are i64 KES cents
pub const KES: i64 = 100;

pub struct Wallet<'a> {
  db: &'a DatabaseConnection,
}

/// Ledger metadata for one balance mutation.
#[derive(Debug, Default, Clone)]
pub struct TxMeta {
  pub tx_type: TransactionType,
  pub status: TransactionStatus,
  pub payment_method: Option<String>,
  pub phone_number: Option<String>,
  pub description: Option<String>,
  pub reference_id: Option<String>,
}

impl TxMeta {
  pub fn of(tx_type: TransactionType) -> Self {
    Self { tx_type, ..Default::default() }
  }

  pub fn describe(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  pub fn reference(mut self, reference: impl Into<String>) -> Self {
    self.reference_id = Some(reference.into());
    self
  }

  pub fn phone(mut self, phone: impl Into<String>) -> Self {
    self.phone_number = Some(phone.into());
    self
  }

  pub fn method(mut self, method: impl Into<String>) -> Self {
    self.payment_method = Some(method.into());
    self
  }
}

impl<'a> Wallet<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn balance(&self, user_id: Uuid) -> Result<i64> {
    let profile = profile::Entity::find_by_id(user_id)
      .one(self.db)
      .await?
      .ok_or(Error::ProfileNotFound)?;
    Ok(profile.wallet_balance)
  }

  /// The single mutation path for wallet balances. Checks the resulting
  /// balance stays non-negative, writes it, and appends the paired
  /// transaction row on the same connection. Callers that need additional
  /// rows in the same unit of work pass their open transaction as `conn`.
  pub async fn apply<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    delta: i64,
    meta: TxMeta,
  ) -> Result<(i64, transaction::Model)> {
    if delta == 0 {
      return Err(Error::InvalidAmount("amount must be non-zero".into()));
    }

    let profile = profile::Entity::find_by_id(user_id)
      .one(conn)
      .await?
      .ok_or(Error::ProfileNotFound)?;

    let new_balance = profile.wallet_balance + delta;
    if new_balance < 0 {
      return Err(Error::InsufficientBalance);
    }

    profile::ActiveModel { wallet_balance: Set(new_balance), ..profile.into() }
      .update(conn)
      .await?;

    let now = Utc::now().naive_utc();
    let completed = meta.status == TransactionStatus::Completed;

    let tx = transaction::ActiveModel {
      id: NotSet,
      user_id: Set(user_id),
      tx_type: Set(meta.tx_type),
      amount: Set(delta),
      status: Set(meta.status),
      payment_method: Set(meta.payment_method),
      phone_number: Set(meta.phone_number),
      description: Set(meta.description),
      reference_id: Set(meta.reference_id),
      created_at: Set(now),
      completed_at: Set(completed.then_some(now)),
    }
    .insert(conn)
    .await?;

    Ok((new_balance, tx))
  }

  /// Appends a pending ledger row without touching the balance. The credit
  /// lands later through `settle`, or never does (failed, expired).
  pub async fn record_pending<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    amount: i64,
    meta: TxMeta,
  ) -> Result<transaction::Model> {
    if amount <= 0 {
      return Err(Error::InvalidAmount("credit must be positive".into()));
    }

    profile::Entity::find_by_id(user_id)
      .one(conn)
      .await?
      .ok_or(Error::ProfileNotFound)?;

    Ok(
      transaction::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        tx_type: Set(meta.tx_type),
        amount: Set(amount),
        status: Set(TransactionStatus::Pending),
        payment_method: Set(meta.payment_method),
        phone_number: Set(meta.phone_number),
        description: Set(meta.description),
        reference_id: Set(meta.reference_id),
        created_at: Set(Utc::now().naive_utc()),
        completed_at: Set(None),
      }
      .insert(conn)
      .await?,
    )
  }

  /// Completes a pending credit written earlier by `record_pending` and
  /// moves the balance. Deposits use this: the ledger row exists from the
  /// moment the payment starts, the money arrives when the provider
  /// confirms.
  pub async fn settle<C: ConnectionTrait>(
    conn: &C,
    transaction_id: i32,
    reference: Option<String>,
  ) -> Result<(i64, transaction::Model)> {
    let tx = transaction::Entity::find_by_id(transaction_id)
      .one(conn)
      .await?
      .ok_or(Error::PaymentNotFound)?;

    if tx.status != TransactionStatus::Pending {
      return Err(Error::AlreadyProcessed);
    }
    if tx.amount <= 0 {
      return Err(Error::InvalidAmount("only credits can settle".into()));
    }

    let profile = profile::Entity::find_by_id(tx.user_id)
      .one(conn)
      .await?
      .ok_or(Error::ProfileNotFound)?;

    let new_balance = profile.wallet_balance + tx.amount;

    profile::ActiveModel { wallet_balance: Set(new_balance), ..profile.into() }
      .update(conn)
      .await?;

    let mut model = transaction::ActiveModel::from(tx);
    model.status = Set(TransactionStatus::Completed);
    model.completed_at = Set(Some(Utc::now().naive_utc()));
    if let Some(reference) = reference {
      model.reference_id = Set(Some(reference));
    }

    Ok((new_balance, model.update(conn).await?))
  }

  pub async fn credit(
    &self,
    user_id: Uuid,
    amount: i64,
    meta: TxMeta,
  ) -> Result<i64> {
    if amount <= 0 {
      return Err(Error::InvalidAmount("credit must be positive".into()));
    }

    let txn = self.db.begin().await?;
    let (balance, _) = Self::apply(&txn, user_id, amount, meta).await?;
    txn.commit().await?;
    Ok(balance)
  }

  /// Manual balance correction by an operator. Positive amounts are logged
  /// as admin deposits, negative ones as admin withdrawals.
  pub async fn admin_adjust(
    &self,
    user_id: Uuid,
    amount: i64,
    admin_id: Uuid,
    notes: Option<String>,
  ) -> Result<i64> {
    let tx_type = if amount > 0 {
      TransactionType::AdminDeposit
    } else {
      TransactionType::AdminWithdrawal
    };

    let mut meta = TxMeta::of(tx_type).reference(admin_id.to_string());
    meta.description = notes;

    let txn = self.db.begin().await?;
    let (balance, _) = Self::apply(&txn, user_id, amount, meta).await?;
    txn.commit().await?;
    Ok(balance)
  }

  pub async fn transactions(
    &self,
    user_id: Uuid,
    limit: u64,
  ) -> Result<Vec<transaction::Model>> {
    Ok(
      transaction::Entity::find()
        .filter(transaction::Column::UserId.eq(user_id))
        .order_by_desc(transaction::Column::CreatedAt)
        .limit(limit)
        .all(self.db)
        .await?,
    )
  }
}
