use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db;
use crate::errors::AppError;
use crate::external::quote_provider::REFERENCE_PRICE;
use crate::utils::round2;

/// Longest look-back honored. Larger requests are clamped, not rejected.
const MAX_HISTORY_DAYS: i64 = 365;

/// Four index-aligned series for charting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySeries {
    pub timestamps: Vec<String>,
    pub prices: Vec<f64>,
    pub vwaps: Vec<Option<f64>>,
    pub ma9s: Vec<Option<f64>>,
}

impl HistorySeries {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            timestamps: Vec::with_capacity(capacity),
            prices: Vec::with_capacity(capacity),
            vwaps: Vec::with_capacity(capacity),
            ma9s: Vec::with_capacity(capacity),
        }
    }
}

/// Synthesize `days * 24` hourly samples ending at `now`, newest first.
///
/// Each hour offset seeds its own small PRNG (plausibility only, nothing
/// cryptographic), so a sample depends only on its offset and the series
/// needs no stored state.
pub fn synthesize(days: i64, now: DateTime<Utc>) -> HistorySeries {
    let hours = days.clamp(0, MAX_HISTORY_DAYS) * 24;
    let mut series = HistorySeries::with_capacity(hours as usize);

    for hour_offset in 0..hours {
        let mut rng = StdRng::seed_from_u64(hour_offset as u64);

        let trend = -0.1 * hour_offset as f64;
        let volatility = (hour_offset % 10) as f64 * 0.05;
        let noise = f64::from(rng.random_range(0u32..100)) * 0.01 - 0.5;
        let price = round2(REFERENCE_PRICE + trend + volatility + noise);

        let vwap = round2(price + f64::from(rng.random_range(0u32..20)) * 0.01 - 0.1);
        let ma9 = round2(price + f64::from(rng.random_range(0u32..15)) * 0.01 - 0.075);

        series
            .timestamps
            .push((now - Duration::hours(hour_offset)).to_rfc3339());
        series.prices.push(price);
        series.vwaps.push(Some(vwap));
        series.ma9s.push(Some(ma9));
    }

    series
}

/// Chart points actually recorded in the last `days` days, oldest first.
/// An empty series is a valid answer for a quiet store.
pub async fn stored(
    pool: &SqlitePool,
    days: i64,
    now: DateTime<Utc>,
) -> Result<HistorySeries, AppError> {
    let cutoff = now - Duration::days(days.clamp(0, MAX_HISTORY_DAYS));
    let points = db::chart_point_queries::fetch_since(pool, cutoff).await?;

    let mut series = HistorySeries::with_capacity(points.len());
    for point in points {
        series.timestamps.push(point.timestamp.to_rfc3339());
        series.prices.push(round2(point.price));
        series.vwaps.push(point.vwap.map(round2));
        series.ma9s.push(point.ma9.map(round2));
    }

    Ok(series)
}
