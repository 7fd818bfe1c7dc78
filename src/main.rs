mod app;
mod config;
mod db;
mod errors;
mod external;
mod logging;
mod models;
mod routes;
mod services;
mod state;
mod utils;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::external::paper::PaperQuoteProvider;
use crate::external::quote_provider::QuoteProvider;
use crate::logging::LoggingConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let logging_config = LoggingConfig::from_env();
    logging::init_logging(&logging_config);

    let config = AppConfig::from_env();
    config.validate().map_err(anyhow::Error::msg)?;

    // One connection keeps `sqlite::memory:` a single shared database instead
    // of a blank one per pooled connection.
    let connect_options =
        SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await?;

    sqlx::migrate!().run(&pool).await?;
    tracing::info!("Database tables created/verified");

    let provider = PaperQuoteProvider::from_env()?;
    if provider.has_credentials() {
        tracing::info!("📊 Broker credentials found - live quotes not wired up, serving paper data");
    } else {
        tracing::info!("📊 Using paper quote provider");
    }
    let quotes: Arc<dyn QuoteProvider> = Arc::new(provider);

    let state = AppState {
        pool,
        quotes,
        config: config.clone(),
    };
    let app = app::create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(
        "🚀 {} running at http://{}/",
        logging_config.service_name,
        addr
    );
    axum::serve(listener, app).await?;

    Ok(())
}
