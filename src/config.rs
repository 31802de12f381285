use std::env;

use anyhow::Context;

use crate::sv::wallet::KES;

#[derive(Clone, Debug)]
pub struct Config {
  pub database_url: String,
  pub port: u16,
  /// Smallest withdrawal a client may request, in KES cents
  pub min_withdrawal: i64,
  /// Referrer's cut of a referred user's first investment, in percent
  pub referral_percent: i64,
  /// UTC hour at which the daily accrual batch runs
  pub accrual_hour_utc: u32,
  /// How long an initiated deposit may await provider confirmation
  pub payment_ttl_mins: i64,
  pub mpesa: MpesaConfig,
}

#[derive(Clone, Debug)]
pub struct MpesaConfig {
  pub base_url: String,
  pub consumer_key: String,
  pub consumer_secret: String,
  pub shortcode: String,
  pub passkey: String,
  pub callback_url: String,
  pub webhook_secret: String,
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    let mpesa = MpesaConfig {
      base_url: env::var("MPESA_BASE_URL")
        .unwrap_or_else(|_| "https://sandbox.safaricom.co.ke".into()),
      consumer_key: env::var("MPESA_CONSUMER_KEY")
        .context("MPESA_CONSUMER_KEY not set")?,
      consumer_secret: env::var("MPESA_CONSUMER_SECRET")
        .context("MPESA_CONSUMER_SECRET not set")?,
      shortcode: env::var("MPESA_SHORTCODE").context("MPESA_SHORTCODE not set")?,
      passkey: env::var("MPESA_PASSKEY").context("MPESA_PASSKEY not set")?,
      callback_url: env::var("MPESA_CALLBACK_URL")
        .context("MPESA_CALLBACK_URL not set")?,
      webhook_secret: env::var("WEBHOOK_SECRET")
        .context("WEBHOOK_SECRET not set")?,
    };

    Ok(Self {
      database_url: env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:cashtelle.db?mode=rwc".into()),
      port: env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(3000),
      min_withdrawal: env::var("MIN_WITHDRAWAL_KES")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .map(|kes| kes * KES)
        .unwrap_or(100 * KES),
      referral_percent: env::var("REFERRAL_PERCENT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10),
      accrual_hour_utc: env::var("ACCRUAL_HOUR_UTC")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|h| *h < 24)
        .unwrap_or(0),
      payment_ttl_mins: env::var("PAYMENT_TTL_MINS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(60),
      mpesa,
    })
  }
}
