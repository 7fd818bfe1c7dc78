use sqlx::SqlitePool;

use crate::models::{ChartPoint, QuoteSnapshot};

/// Append a snapshot and its paired chart point in one transaction.
/// Either both rows land or neither does.
pub async fn insert_with_point(
    pool: &SqlitePool,
    snapshot: &QuoteSnapshot,
    point: &ChartPoint,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO quote_snapshots
           (id, symbol, timestamp, last_trade, bid, ask, session_vwap, ma9,
            nearest_strike, call_bid, call_ask, put_bid, put_ask)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(snapshot.id)
    .bind(&snapshot.symbol)
    .bind(snapshot.timestamp)
    .bind(snapshot.last_trade)
    .bind(snapshot.bid)
    .bind(snapshot.ask)
    .bind(snapshot.session_vwap)
    .bind(snapshot.ma9)
    .bind(snapshot.nearest_strike)
    .bind(snapshot.call_bid)
    .bind(snapshot.call_ask)
    .bind(snapshot.put_bid)
    .bind(snapshot.put_ask)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO chart_points (id, timestamp, price, vwap, ma9, kind)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(point.id)
    .bind(point.timestamp)
    .bind(point.price)
    .bind(point.vwap)
    .bind(point.ma9)
    .bind(&point.kind)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn fetch_latest(pool: &SqlitePool) -> Result<Option<QuoteSnapshot>, sqlx::Error> {
    sqlx::query_as::<_, QuoteSnapshot>(
        "SELECT id, symbol, timestamp, last_trade, bid, ask, session_vwap, ma9,
                nearest_strike, call_bid, call_ask, put_bid, put_ask
         FROM quote_snapshots
         ORDER BY timestamp DESC
         LIMIT 1",
    )
    .fetch_optional(pool)
    .await
}

pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quote_snapshots")
        .fetch_one(pool)
        .await
}
