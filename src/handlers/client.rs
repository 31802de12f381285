use axum::{
  Json,
  extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::{
  entity::{investment, package, profile, referral, transaction, withdrawal},
  prelude::*,
  sv::{
    self, Investments, Payments, Profiles, Referrals, Wallet, Withdrawals,
    investments::InvestmentStats, referrals::ReferralStats, wallet::KES,
  },
  state::AppState,
};

#[derive(Serialize)]
pub struct Health {
  status: &'static str,
}

pub async fn health() -> Json<Health> {
  Json(Health { status: "ok" })
}

pub async fn list_packages(
  State(app): State<Arc<AppState>>,
) -> Result<Json<Vec<package::Model>>> {
  Ok(Json(sv::Catalog::new(&app.db).list_active().await?))
}

#[derive(Deserialize)]
pub struct SignupRequest {
  pub full_name: Option<String>,
  pub phone: Option<String>,
  pub referral_code: Option<String>,
}

pub async fn signup(
  State(app): State<Arc<AppState>>,
  Json(req): Json<SignupRequest>,
) -> Result<Json<profile::Model>> {
  let profile = Profiles::new(&app.db)
    .signup(req.full_name, req.phone, req.referral_code.as_deref())
    .await?;

  info!("new signup {}", profile.id);
  Ok(Json(profile))
}

#[derive(Serialize)]
pub struct WalletView {
  pub balance: i64,
  pub transactions: Vec<transaction::Model>,
}

pub async fn wallet(
  State(app): State<Arc<AppState>>,
  Path(user_id): Path<Uuid>,
) -> Result<Json<WalletView>> {
  let wallet = Wallet::new(&app.db);

  Ok(Json(WalletView {
    balance: wallet.balance(user_id).await?,
    transactions: wallet.transactions(user_id, 50).await?,
  }))
}

#[derive(Deserialize)]
pub struct DepositRequest {
  pub user_id: Uuid,
  /// KES cents, must be a whole number of KES
  pub amount: i64,
  pub phone: String,
}

#[derive(Serialize)]
pub struct DepositResponse {
  pub transaction_id: i32,
  pub checkout_request_id: String,
  pub customer_message: Option<String>,
}

/// Starts an M-Pesa deposit: ledger row first, then the STK push, then the
/// tracker keyed by the provider's checkout id. The wallet is credited only
/// when the webhook confirms.
pub async fn create_deposit(
  State(app): State<Arc<AppState>>,
  Json(req): Json<DepositRequest>,
) -> Result<Json<DepositResponse>> {
  let phone = sv::mpesa::normalize_phone(&req.phone)?;

  if req.amount <= 0 || req.amount % KES != 0 {
    return Err(Error::InvalidAmount(
      "deposit must be a positive whole number of KES".into(),
    ));
  }

  let payments = Payments::new(&app.db);
  let tx = payments.begin_deposit(req.user_id, req.amount, &phone).await?;

  let push = match app
    .mpesa
    .stk_push(&phone, (req.amount / KES) as u64, &tx.id.to_string())
    .await
  {
    Ok(push) => push,
    Err(err) => {
      payments.abandon(tx).await?;
      return Err(err);
    }
  };

  payments
    .track(
      &push.checkout_request_id,
      &tx,
      TimeDelta::minutes(app.config.payment_ttl_mins),
    )
    .await?;

  info!(
    "deposit {} initiated for {}: checkout {}",
    tx.id, req.user_id, push.checkout_request_id
  );

  Ok(Json(DepositResponse {
    transaction_id: tx.id,
    checkout_request_id: push.checkout_request_id,
    customer_message: push.customer_message,
  }))
}

#[derive(Deserialize)]
pub struct InvestRequest {
  pub user_id: Uuid,
  pub package_id: i32,
}

pub async fn invest(
  State(app): State<Arc<AppState>>,
  Json(req): Json<InvestRequest>,
) -> Result<Json<investment::Model>> {
  let investment = Investments::new(&app.db)
    .invest(req.user_id, req.package_id, app.config.referral_percent)
    .await?;

  Ok(Json(investment))
}

#[derive(Serialize)]
pub struct InvestmentsView {
  pub stats: InvestmentStats,
  pub investments: Vec<investment::Model>,
}

pub async fn investments(
  State(app): State<Arc<AppState>>,
  Path(user_id): Path<Uuid>,
) -> Result<Json<InvestmentsView>> {
  let investments = Investments::new(&app.db);

  Ok(Json(InvestmentsView {
    stats: investments.stats(user_id).await?,
    investments: investments.by_user(user_id).await?,
  }))
}

#[derive(Deserialize)]
pub struct WithdrawalRequest {
  pub user_id: Uuid,
  pub amount: i64,
  pub phone: String,
}

pub async fn request_withdrawal(
  State(app): State<Arc<AppState>>,
  Json(req): Json<WithdrawalRequest>,
) -> Result<Json<withdrawal::Model>> {
  let phone = sv::mpesa::normalize_phone(&req.phone)?;

  let request = Withdrawals::new(&app.db)
    .request(req.user_id, req.amount, phone, app.config.min_withdrawal)
    .await?;

  Ok(Json(request))
}

pub async fn withdrawals(
  State(app): State<Arc<AppState>>,
  Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<withdrawal::Model>>> {
  Ok(Json(Withdrawals::new(&app.db).by_user(user_id).await?))
}

#[derive(Serialize)]
pub struct ReferralsView {
  pub stats: ReferralStats,
  pub referrals: Vec<referral::Model>,
}

pub async fn referrals(
  State(app): State<Arc<AppState>>,
  Path(user_id): Path<Uuid>,
) -> Result<Json<ReferralsView>> {
  let referrals = Referrals::new(&app.db);

  Ok(Json(ReferralsView {
    stats: referrals.stats(user_id).await?,
    referrals: referrals.by_referrer(user_id).await?,
  }))
}
