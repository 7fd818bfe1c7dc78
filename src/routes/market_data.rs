use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::services::market_data_service::{self, CurrentData};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_current_data))
        .route("/latest", get(get_latest_snapshot))
        .route("/count", get(get_data_count))
        .route("/refresh", post(refresh_data))
}

#[derive(Debug, Serialize)]
pub struct DataCountResponse {
    pub data_points: i64,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub message: String,
}

async fn get_current_data(State(state): State<AppState>) -> Result<Json<CurrentData>, AppError> {
    info!("GET /api/market-data - Getting current market data");

    let data = market_data_service::get_current(&state.pool, state.quotes.as_ref(), &state.config)
        .await
        .map_err(|e| {
            error!("Failed to get current market data: {}", e);
            e
        })?;

    Ok(Json(data))
}

async fn get_latest_snapshot(State(state): State<AppState>) -> Result<Json<CurrentData>, AppError> {
    info!("GET /api/market-data/latest - Getting latest stored snapshot");

    let data = market_data_service::get_latest(&state.pool).await.map_err(|e| {
        match &e {
            AppError::NotFound(_) => warn!("No stored snapshot to serve yet"),
            _ => error!("Failed to get latest snapshot: {}", e),
        }
        e
    })?;

    Ok(Json(data))
}

async fn get_data_count(State(state): State<AppState>) -> Json<DataCountResponse> {
    info!("GET /api/market-data/count - Counting stored data points");

    let data_points = match market_data_service::data_count(&state.pool).await {
        Ok(count) => count,
        Err(e) => {
            // Availability over accuracy: a broken store answers with the
            // synthetic counter, not a 500.
            warn!("Store count unavailable, serving synthetic count: {}", e);
            market_data_service::synthetic_count(Utc::now())
        }
    };

    Json(DataCountResponse { data_points })
}

async fn refresh_data(State(state): State<AppState>) -> Result<Json<RefreshResponse>, AppError> {
    info!("POST /api/market-data/refresh - Forcing a refresh");

    market_data_service::refresh(&state.pool, state.quotes.as_ref(), &state.config)
        .await
        .map_err(|e| {
            error!("Failed to refresh market data: {}", e);
            e
        })?;

    Ok(Json(RefreshResponse {
        message: "Data refreshed successfully".to_string(),
    }))
}
