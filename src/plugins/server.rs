use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use axum::{
  Router,
  routing::{delete, get, patch, post},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

use crate::{handlers, prelude::*, state::AppState};

pub struct Server;

#[async_trait]
impl super::Plugin for Server {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let governor_conf = Arc::new(
      GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(100)
        .finish()
        .context("Failed to build rate limiter config")?,
    );

    let governor_limiter = governor_conf.limiter().clone();

    tokio::spawn(async move {
      loop {
        tokio::time::sleep(Duration::from_secs(60)).await;
        governor_limiter.retain_recent();
      }
    });

    let router = Router::new()
      .route("/health", get(handlers::client::health))
      .route("/api/packages", get(handlers::client::list_packages))
      .route("/api/signup", post(handlers::client::signup))
      .route("/api/wallet/{user_id}", get(handlers::client::wallet))
      .route("/api/deposits", post(handlers::client::create_deposit))
      .route("/api/invest", post(handlers::client::invest))
      .route("/api/investments/{user_id}", get(handlers::client::investments))
      .route(
        "/api/withdrawals",
        post(handlers::client::request_withdrawal),
      )
      .route("/api/withdrawals/{user_id}", get(handlers::client::withdrawals))
      .route("/api/referrals/{user_id}", get(handlers::client::referrals))
      .route("/api/webhooks/mpesa", post(handlers::webhook::mpesa))
      .route("/api/admin/packages", get(handlers::admin::list_packages))
      .route("/api/admin/packages", post(handlers::admin::create_package))
      .route(
        "/api/admin/packages/{id}",
        patch(handlers::admin::update_package),
      )
      .route(
        "/api/admin/packages/{id}",
        delete(handlers::admin::deactivate_package),
      )
      .route("/api/admin/users", get(handlers::admin::list_users))
      .route(
        "/api/admin/investments/{id}",
        post(handlers::admin::manage_investment),
      )
      .route(
        "/api/admin/withdrawals",
        get(handlers::admin::pending_withdrawals),
      )
      .route(
        "/api/admin/withdrawals/{id}",
        post(handlers::admin::decide_withdrawal),
      )
      .route("/api/admin/balance", post(handlers::admin::adjust_balance))
      .route("/api/admin/summary", get(handlers::admin::financial_summary))
      .route("/api/admin/accrual", post(handlers::admin::run_accrual))
      .layer(
        ServiceBuilder::new()
          .layer(TraceLayer::new_for_http())
          .layer(GovernorLayer::new(governor_conf))
          .layer(
            CorsLayer::new()
              .allow_origin(Any)
              .allow_methods(Any)
              .allow_headers(Any),
          ),
      )
      .with_state(app.clone())
      .into_make_service_with_connect_info::<SocketAddr>();

    let addr = SocketAddr::from(([0, 0, 0, 0], app.config.port));

    info!("HTTP Server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
      .await
      .context("Failed to bind server port")?;
    axum::serve(listener, router).await.context("Server error")?;

    Ok(())
  }
}
