mod config;
mod entity;
mod error;
mod handlers;
mod plugins;
mod prelude;
mod state;
mod sv;

use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{config::Config, prelude::*, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "cashtelle=debug,tower_http=debug,axum=trace,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = Config::from_env()?;

  info!("Starting Cash-telle v{}", env!("CARGO_PKG_VERSION"));

  let app = AppState::new(config).await?;

  plugins::App::new()
    .register(plugins::server::Server)
    .register(plugins::cron::DailyAccrual)
    .register(plugins::cron::PaymentsGc)
    .run(app)
    .await;

  Ok(())
}
