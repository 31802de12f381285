use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("profile not found")]
  ProfileNotFound,
  #[error("package not found")]
  PackageNotFound,
  #[error("package is not open for purchase")]
  PackageInactive,
  #[error("investment not found")]
  InvestmentNotFound,
  #[error("withdrawal request not found")]
  WithdrawalNotFound,
  #[error("payment not found")]
  PaymentNotFound,
  #[error("referral code not found")]
  ReferralCodeNotFound,
  #[error("insufficient balance")]
  InsufficientBalance,
  #[error("invalid amount: {0}")]
  InvalidAmount(String),
  #[error("invalid arguments: {0}")]
  InvalidArgs(String),
  #[error("already processed")]
  AlreadyProcessed,
  #[error("admin privileges required")]
  Forbidden,
  #[error("invalid webhook signature")]
  InvalidSignature,
  #[error("payment provider error: {0}")]
  Provider(String),
  #[error(transparent)]
  Db(#[from] sea_orm::DbErr),
}

impl Error {
  fn status(&self) -> StatusCode {
    match self {
      Error::ProfileNotFound
      | Error::PackageNotFound
      | Error::InvestmentNotFound
      | Error::WithdrawalNotFound
      | Error::PaymentNotFound
      | Error::ReferralCodeNotFound => StatusCode::NOT_FOUND,
      Error::InsufficientBalance => StatusCode::UNPROCESSABLE_ENTITY,
      Error::InvalidAmount(_) | Error::InvalidArgs(_) => StatusCode::BAD_REQUEST,
      Error::AlreadyProcessed | Error::PackageInactive => StatusCode::CONFLICT,
      Error::Forbidden => StatusCode::FORBIDDEN,
      Error::InvalidSignature => StatusCode::UNAUTHORIZED,
      Error::Provider(_) => StatusCode::BAD_GATEWAY,
      Error::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

#[derive(Serialize)]
struct ErrorBody {
  error: String,
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();

    if status == StatusCode::INTERNAL_SERVER_ERROR {
      tracing::error!("internal error: {self}");
    }

    (status, Json(ErrorBody { error: self.to_string() })).into_response()
  }
}
