use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One immutable snapshot of market state: the underlying quote plus the
/// matched 0DTE call/put pair at the nearest strike. Rows are append-only;
/// "latest" is the row with the greatest timestamp.
///
/// `session_vwap` and `ma9` track `last_trade`; there is no intraday tick
/// history to compute them from.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuoteSnapshot {
    pub id: Uuid,
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub last_trade: f64,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub session_vwap: Option<f64>,
    pub ma9: Option<f64>,
    pub nearest_strike: Option<f64>,
    pub call_bid: Option<f64>,
    pub call_ask: Option<f64>,
    pub put_bid: Option<f64>,
    pub put_ask: Option<f64>,
}
