use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes::{health, history, market_data};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .route("/", get(root))
        .nest("/health", health::router())
        .nest("/api/market-data", market_data::router())
        .nest("/api/history", history::router())
        // The dashboard runs on another origin; stay permissive.
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Strikefeed API", "status": "running" }))
}
