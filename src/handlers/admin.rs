use axum::{
  Json,
  extract::{Path, State},
  http::HeaderMap,
};
use serde::Deserialize;

use crate::{
  entity::{investment, package, profile, withdrawal},
  prelude::*,
  sv::{
    Accrual, Catalog, Investments, Profiles, Summary, Wallet, Withdrawals,
    accrual::AccrualSummary,
    catalog::{NewPackage, PackageUpdate},
    summary::FinancialSummary,
  },
  state::AppState,
};

/// Resolves the acting admin from the `X-Admin-Id` header. The role check
/// runs against the profile row on every call; a client id here is a 403.
async fn acting_admin(app: &AppState, headers: &HeaderMap) -> Result<Uuid> {
  let admin_id = headers
    .get("x-admin-id")
    .and_then(|v| v.to_str().ok())
    .and_then(|v| Uuid::parse_str(v).ok())
    .ok_or(Error::Forbidden)?;

  Profiles::new(&app.db).require_admin(admin_id).await?;
  Ok(admin_id)
}

pub async fn list_packages(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<Vec<package::Model>>> {
  acting_admin(&app, &headers).await?;
  Ok(Json(Catalog::new(&app.db).all().await?))
}

pub async fn create_package(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Json(new): Json<NewPackage>,
) -> Result<Json<package::Model>> {
  let admin = acting_admin(&app, &headers).await?;

  let package = Catalog::new(&app.db).create(new).await?;
  info!("admin {admin} created package {} ({})", package.id, package.name);

  Ok(Json(package))
}

pub async fn update_package(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(id): Path<i32>,
  Json(update): Json<PackageUpdate>,
) -> Result<Json<package::Model>> {
  acting_admin(&app, &headers).await?;
  Ok(Json(Catalog::new(&app.db).update(id, update).await?))
}

pub async fn deactivate_package(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(id): Path<i32>,
) -> Result<Json<package::Model>> {
  let admin = acting_admin(&app, &headers).await?;

  let catalog = Catalog::new(&app.db);
  catalog.deactivate(id).await?;
  info!("admin {admin} deactivated package {id}");

  Ok(Json(catalog.get(id).await?))
}

pub async fn list_users(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<Vec<profile::Model>>> {
  acting_admin(&app, &headers).await?;
  Ok(Json(Profiles::new(&app.db).all().await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentAction {
  Suspend,
  Resume,
}

#[derive(Deserialize)]
pub struct InvestmentDecision {
  pub action: InvestmentAction,
}

pub async fn manage_investment(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(id): Path<i32>,
  Json(decision): Json<InvestmentDecision>,
) -> Result<Json<investment::Model>> {
  let admin = acting_admin(&app, &headers).await?;
  let investments = Investments::new(&app.db);

  match decision.action {
    InvestmentAction::Suspend => investments.suspend(id).await?,
    InvestmentAction::Resume => investments.resume(id).await?,
  }

  let updated = investments.get(id).await?;
  info!("admin {admin} set investment {id} to {:?}", updated.status);

  Ok(Json(updated))
}

pub async fn pending_withdrawals(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<Vec<withdrawal::Model>>> {
  acting_admin(&app, &headers).await?;
  Ok(Json(Withdrawals::new(&app.db).pending().await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalAction {
  Approve,
  Reject,
}

#[derive(Deserialize)]
pub struct WithdrawalDecision {
  pub action: WithdrawalAction,
  pub notes: Option<String>,
}

pub async fn decide_withdrawal(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(id): Path<i32>,
  Json(decision): Json<WithdrawalDecision>,
) -> Result<Json<withdrawal::Model>> {
  let admin = acting_admin(&app, &headers).await?;
  let withdrawals = Withdrawals::new(&app.db);

  let updated = match decision.action {
    WithdrawalAction::Approve => {
      withdrawals.approve(admin, id, decision.notes).await?
    }
    WithdrawalAction::Reject => {
      withdrawals.reject(admin, id, decision.notes).await?
    }
  };

  info!("admin {admin} resolved withdrawal {id}: {:?}", updated.status);
  Ok(Json(updated))
}

#[derive(Deserialize)]
pub struct BalanceAdjustment {
  pub user_id: Uuid,
  /// Signed KES cents
  pub amount: i64,
  pub notes: Option<String>,
}

#[derive(serde::Serialize)]
pub struct BalanceView {
  pub balance: i64,
}

pub async fn adjust_balance(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Json(req): Json<BalanceAdjustment>,
) -> Result<Json<BalanceView>> {
  let admin = acting_admin(&app, &headers).await?;

  let balance = Wallet::new(&app.db)
    .admin_adjust(req.user_id, req.amount, admin, req.notes)
    .await?;

  warn!("admin {admin} adjusted {} by {}", req.user_id, req.amount);
  Ok(Json(BalanceView { balance }))
}

pub async fn financial_summary(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<FinancialSummary>> {
  acting_admin(&app, &headers).await?;
  Ok(Json(Summary::new(&app.db).financial().await?))
}

/// Manual trigger for the daily batch, same code path as the scheduler.
/// Idempotent for the day, so a double click costs nothing.
pub async fn run_accrual(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<AccrualSummary>> {
  let admin = acting_admin(&app, &headers).await?;

  info!("admin {admin} triggered the accrual batch");
  Ok(Json(Accrual::run(&app.db, Utc::now().date_naive()).await?))
}
