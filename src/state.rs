use crate::{config::Config, prelude::*, sv::Mpesa};

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
  pub mpesa: Mpesa,
}

impl AppState {
  pub async fn new(config: Config) -> anyhow::Result<Arc<Self>> {
    let db = Database::connect(&config.database_url).await?;
    migration::Migrator::up(&db, None).await?;

    let mpesa = Mpesa::new(config.mpesa.clone());

    Ok(Arc::new(Self { db, config, mpesa }))
  }
}
