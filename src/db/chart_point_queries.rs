use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::ChartPoint;

/// All points with `timestamp >= cutoff`, oldest first.
pub async fn fetch_since(
    pool: &SqlitePool,
    cutoff: DateTime<Utc>,
) -> Result<Vec<ChartPoint>, sqlx::Error> {
    sqlx::query_as::<_, ChartPoint>(
        "SELECT id, timestamp, price, vwap, ma9, kind
         FROM chart_points
         WHERE timestamp >= ?
         ORDER BY timestamp ASC",
    )
    .bind(cutoff)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chart_points")
        .fetch_one(pool)
        .await
}
