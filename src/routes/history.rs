use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::services::history_service::{self, HistorySeries};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_history))
        .route("/stored", get(get_stored_history))
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    #[serde(default = "default_history_days")]
    pub days: i64,
}

fn default_history_days() -> i64 {
    3
}

async fn get_history(Query(params): Query<HistoryParams>) -> Json<HistorySeries> {
    info!("GET /api/history - Synthesizing {} day(s) of history", params.days);
    Json(history_service::synthesize(params.days, Utc::now()))
}

async fn get_stored_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistorySeries>, AppError> {
    info!("GET /api/history/stored - Reading {} day(s) of stored points", params.days);

    let series = history_service::stored(&state.pool, params.days, Utc::now())
        .await
        .map_err(|e| {
            error!("Failed to read stored history: {}", e);
            e
        })?;

    Ok(Json(series))
}
