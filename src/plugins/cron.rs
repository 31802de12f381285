use std::sync::Arc;

use async_trait::async_trait;

use crate::{plugins::Plugin, prelude::*, state::AppState, sv};

/// Runs the commission batch once per day at the configured UTC hour.
/// The batch itself is idempotent per calendar day, so a restart that
/// lands back on the same day is harmless.
pub struct DailyAccrual;

#[async_trait]
impl Plugin for DailyAccrual {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let hour = app.config.accrual_hour_utc;

    loop {
      let now = Utc::now();

      let today_run = now
        .date_naive()
        .and_hms_opt(hour, 0, 0)
        .expect("valid accrual hour");
      let next_run = if now.naive_utc() < today_run {
        today_run
      } else {
        today_run + TimeDelta::days(1)
      };

      let sleep_duration = (next_run - now.naive_utc())
        .to_std()
        .unwrap_or(Duration::from_secs(60));

      info!(
        "daily accrual scheduled in {} minutes",
        sleep_duration.as_secs() / 60
      );
      tokio::time::sleep(sleep_duration).await;

      match sv::Accrual::run(&app.db, Utc::now().date_naive()).await {
        Ok(summary) => {
          info!("accrual batch done: {} credited", summary.credited);
        }
        Err(e) => error!("accrual batch failed: {}", e),
      }
    }
  }
}

/// Expires deposits the provider never answered.
pub struct PaymentsGc;

#[async_trait]
impl Plugin for PaymentsGc {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let mut interval = tokio::time::interval(Duration::from_secs(60));

    loop {
      interval.tick().await;

      match sv::Payments::new(&app.db).expire_stale(Utc::now().naive_utc()).await
      {
        Ok(0) => {}
        Ok(expired) => info!("expired {expired} stale deposit(s)"),
        Err(e) => error!("payments gc failed: {}", e),
      }
    }
  }
}
