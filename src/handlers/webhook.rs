use axum::{
  Json, body::Bytes, extract::State, http::HeaderMap,
};
use serde::Serialize;

use crate::{
  prelude::*,
  sv::{Mpesa, Payments, payments::Settlement},
  state::AppState,
};

pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// What Daraja expects back; anything else makes it retry.
#[derive(Serialize)]
pub struct Ack {
  #[serde(rename = "ResultCode")]
  result_code: i64,
  #[serde(rename = "ResultDesc")]
  result_desc: &'static str,
}

impl Ack {
  fn ok() -> Json<Self> {
    Json(Self { result_code: 0, result_desc: "Accepted" })
  }
}

/// M-Pesa result callback. Signature is verified over the raw body before
/// anything is parsed. Replays are acknowledged without crediting again.
pub async fn mpesa(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<Json<Ack>> {
  let signature = headers
    .get(SIGNATURE_HEADER)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::InvalidSignature)?;

  if !Mpesa::verify_signature(
    &app.config.mpesa.webhook_secret,
    &body,
    signature,
  ) {
    warn!("webhook with bad signature rejected");
    return Err(Error::InvalidSignature);
  }

  let callback = Mpesa::parse_callback(&body)?;
  let checkout = callback.checkout_request_id.clone();

  let outcome = Payments::new(&app.db)
    .complete(&checkout, callback.success(), callback.receipt())
    .await;

  match outcome {
    Ok(Settlement::Credited { user_id, amount, balance }) => {
      info!(
        "deposit confirmed for {user_id}: +{amount} (balance {balance}), checkout {checkout}"
      );
    }
    Ok(Settlement::Failed { user_id }) => {
      info!(
        "deposit failed for {user_id}: {} ({}), checkout {checkout}",
        callback.result_code, callback.result_desc
      );
    }
    // Duplicate delivery; ack so the provider stops retrying
    Err(Error::AlreadyProcessed) => {
      debug!("replayed callback for checkout {checkout}");
    }
    Err(err) => return Err(err),
  }

  Ok(Ack::ok())
}
