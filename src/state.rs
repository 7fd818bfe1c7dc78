use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::external::quote_provider::QuoteProvider;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub quotes: Arc<dyn QuoteProvider>,
    pub config: AppConfig,
}
