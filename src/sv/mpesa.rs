//! M-Pesa Daraja integration for STK push deposits
//! API docs: https://developer.safaricom.co.ke/APIs/MpesaExpressSimulate
//!
//! The client drives the deposit flow: obtain an OAuth token, fire an STK
//! push at the client's phone, and later interpret the asynchronous result
//! callback delivered to our webhook.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{config::MpesaConfig, prelude::*};

#[derive(Debug, Deserialize)]
struct TokenResponse {
  access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct StkPushRequest {
  business_short_code: String,
  password: String,
  timestamp: String,
  transaction_type: String,
  /// Whole KES; Daraja does not take cents
  amount: u64,
  party_a: String,
  party_b: String,
  phone_number: String,
  #[serde(rename = "CallBackURL")]
  call_back_url: String,
  account_reference: String,
  transaction_desc: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StkPushResponse {
  #[serde(rename = "MerchantRequestID")]
  pub merchant_request_id: String,
  #[serde(rename = "CheckoutRequestID")]
  pub checkout_request_id: String,
  pub response_code: String,
  pub response_description: String,
  pub customer_message: Option<String>,
}

/// The callback body Daraja POSTs to our webhook, outermost envelope in.
#[derive(Debug, Deserialize)]
pub struct CallbackEnvelope {
  #[serde(rename = "Body")]
  pub body: CallbackBody,
}

#[derive(Debug, Deserialize)]
pub struct CallbackBody {
  #[serde(rename = "stkCallback")]
  pub stk_callback: StkCallback,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StkCallback {
  #[serde(rename = "MerchantRequestID")]
  pub merchant_request_id: String,
  #[serde(rename = "CheckoutRequestID")]
  pub checkout_request_id: String,
  pub result_code: i64,
  pub result_desc: String,
  pub callback_metadata: Option<CallbackMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackMetadata {
  #[serde(rename = "Item")]
  pub item: Vec<MetadataItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetadataItem {
  pub name: String,
  #[serde(default)]
  pub value: Option<json::Value>,
}

impl StkCallback {
  pub fn success(&self) -> bool {
    self.result_code == 0
  }

  /// M-Pesa receipt number, present on successful payments only.
  pub fn receipt(&self) -> Option<String> {
    self.metadata("MpesaReceiptNumber")?.as_str().map(str::to_string)
  }

  fn metadata(&self, name: &str) -> Option<&json::Value> {
    self
      .callback_metadata
      .as_ref()?
      .item
      .iter()
      .find(|item| item.name == name)?
      .value
      .as_ref()
  }
}

/// Daraja client for STK push deposits
#[derive(Clone)]
pub struct Mpesa {
  client: Client,
  config: MpesaConfig,
}

impl Mpesa {
  pub fn new(config: MpesaConfig) -> Self {
    Self { client: Client::new(), config }
  }

  async fn access_token(&self) -> Result<String> {
    let url = format!(
      "{}/oauth/v1/generate?grant_type=client_credentials",
      self.config.base_url
    );

    let response = self
      .client
      .get(&url)
      .basic_auth(&self.config.consumer_key, Some(&self.config.consumer_secret))
      .send()
      .await
      .map_err(|e| Error::Provider(format!("token request failed: {e}")))?;

    let token: TokenResponse = response
      .json()
      .await
      .map_err(|e| Error::Provider(format!("bad token response: {e}")))?;

    Ok(token.access_token)
  }

  fn password(&self, timestamp: &str) -> String {
    BASE64.encode(format!(
      "{}{}{timestamp}",
      self.config.shortcode, self.config.passkey
    ))
  }

  /// Prompts `phone` to authorize a payment of `amount_kes` whole KES.
  /// The returned checkout request id is the correlation key for the
  /// eventual callback.
  pub async fn stk_push(
    &self,
    phone: &str,
    amount_kes: u64,
    account: &str,
  ) -> Result<StkPushResponse> {
    let token = self.access_token().await?;
    let timestamp = Utc::now().format("%Y%m%d%H%M%S").to_string();

    let request = StkPushRequest {
      business_short_code: self.config.shortcode.clone(),
      password: self.password(&timestamp),
      timestamp,
      transaction_type: "CustomerPayBillOnline".into(),
      amount: amount_kes,
      party_a: phone.to_string(),
      party_b: self.config.shortcode.clone(),
      phone_number: phone.to_string(),
      call_back_url: self.config.callback_url.clone(),
      account_reference: account.to_string(),
      transaction_desc: format!("Deposit of KES {amount_kes}"),
    };

    let url =
      format!("{}/mpesa/stkpush/v1/processrequest", self.config.base_url);

    let response = self
      .client
      .post(&url)
      .bearer_auth(token)
      .json(&request)
      .send()
      .await
      .map_err(|e| Error::Provider(format!("stk push failed: {e}")))?;

    let push: StkPushResponse = response
      .json()
      .await
      .map_err(|e| Error::Provider(format!("bad stk push response: {e}")))?;

    if push.response_code != "0" {
      return Err(Error::Provider(format!(
        "stk push rejected: {}",
        push.response_description
      )));
    }

    Ok(push)
  }

  pub fn parse_callback(body: &[u8]) -> Result<StkCallback> {
    let envelope: CallbackEnvelope = json::from_slice(body)
      .map_err(|e| Error::Provider(format!("bad callback body: {e}")))?;
    Ok(envelope.body.stk_callback)
  }

  /// Verify webhook signature: HMAC-SHA256 of the raw body with the SHA256
  /// hash of the shared secret as key.
  pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let secret_hash = {
      use sha2::Digest;
      let mut hasher = Sha256::new();
      hasher.update(secret.as_bytes());
      hasher.finalize()
    };

    let mut mac = HmacSha256::new_from_slice(&secret_hash)
      .expect("HMAC can take key of any size");
    mac.update(body);

    let expected = hex::encode(mac.finalize().into_bytes());
    expected == signature
  }
}

/// Canonicalizes a Kenyan phone number to the 254XXXXXXXXX form Daraja
/// expects. Accepts 07/01 local forms, bare 7/1 subscriber numbers and
/// +254 international form.
pub fn normalize_phone(raw: &str) -> Result<String> {
  let cleaned: String =
    raw.chars().filter(|c| !c.is_whitespace() && *c != '+').collect();

  if !cleaned.chars().all(|c| c.is_ascii_digit()) {
    return Err(Error::InvalidArgs(format!("invalid phone number: {raw}")));
  }

  let normalized = match (cleaned.len(), cleaned.as_bytes()) {
    (12, [b'2', b'5', b'4', ..]) => cleaned,
    (10, [b'0', b'7' | b'1', ..]) => format!("254{}", &cleaned[1..]),
    (9, [b'7' | b'1', ..]) => format!("254{cleaned}"),
    _ => {
      return Err(Error::InvalidArgs(format!("invalid phone number: {raw}")));
    }
  };

  Ok(normalized)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_normalize_phone_forms() {
    for raw in
      ["0712345678", "712345678", "254712345678", "+254 712 345 678"]
    {
      assert_eq!(normalize_phone(raw).unwrap(), "254712345678", "{raw}");
    }

    assert_eq!(normalize_phone("0110123456").unwrap(), "254110123456");
  }

  #[test]
  fn test_normalize_phone_rejects_garbage() {
    for raw in ["", "12345", "07123456789012", "07abc45678"] {
      assert!(normalize_phone(raw).is_err(), "{raw}");
    }
  }

  #[test]
  fn test_parse_successful_callback() {
    let body = br#"{"Body":{"stkCallback":{"MerchantRequestID":"29115-34620561-1","CheckoutRequestID":"ws_CO_191220191020363925","ResultCode":0,"ResultDesc":"The service request is processed successfully.","CallbackMetadata":{"Item":[{"Name":"Amount","Value":1000.0},{"Name":"MpesaReceiptNumber","Value":"NLJ7RT61SV"},{"Name":"TransactionDate","Value":20191219102115},{"Name":"PhoneNumber","Value":254708374149}]}}}}"#;

    let callback = Mpesa::parse_callback(body).unwrap();
    assert!(callback.success());
    assert_eq!(callback.checkout_request_id, "ws_CO_191220191020363925");
    assert_eq!(callback.receipt().unwrap(), "NLJ7RT61SV");
  }

  #[test]
  fn test_parse_cancelled_callback() {
    let body = br#"{"Body":{"stkCallback":{"MerchantRequestID":"29115-34620561-1","CheckoutRequestID":"ws_CO_191220191020363925","ResultCode":1032,"ResultDesc":"Request cancelled by user."}}}"#;

    let callback = Mpesa::parse_callback(body).unwrap();
    assert!(!callback.success());
    assert!(callback.receipt().is_none());
  }

  #[test]
  fn test_verify_signature() {
    use hmac::{Hmac, Mac};
    use sha2::{Digest, Sha256};

    let secret = "test-webhook-secret";
    let body = b"{\"Body\":{}}";

    let key = Sha256::digest(secret.as_bytes());
    let mut mac = Hmac::<Sha256>::new_from_slice(&key).unwrap();
    mac.update(body);
    let signature = hex::encode(mac.finalize().into_bytes());

    assert!(Mpesa::verify_signature(secret, body, &signature));
    assert!(!Mpesa::verify_signature(secret, body, "deadbeef"));
    assert!(!Mpesa::verify_signature(secret, b"tampered", &signature));
  }
}
