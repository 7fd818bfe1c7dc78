use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::db;
use crate::errors::AppError;
use crate::external::paper;
use crate::external::quote_provider::{EquityQuote, QuoteProvider, ZeroDtePair};
use crate::models::{ChartPoint, QuoteSnapshot};
use crate::services::freshness;
use crate::utils::round2;

/// Wire shape of a current-data response. Every numeric field is rounded to
/// two decimals; absent option fields serialize as null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentData {
    pub timestamp: String,
    pub last_trade: f64,
    pub session_vwap: Option<f64>,
    pub ma9: Option<f64>,
    pub nearest_strike: Option<f64>,
    pub call_bid: Option<f64>,
    pub call_ask: Option<f64>,
    pub put_bid: Option<f64>,
    pub put_ask: Option<f64>,
}

/// Serve the stored snapshot while it is fresh, refresh and append otherwise.
pub async fn get_current(
    pool: &SqlitePool,
    provider: &dyn QuoteProvider,
    config: &AppConfig,
) -> Result<CurrentData, AppError> {
    // A store that cannot answer "latest" behaves like an empty one: the
    // request falls through to a refresh instead of failing.
    let latest = match db::snapshot_queries::fetch_latest(pool).await {
        Ok(latest) => latest,
        Err(e) => {
            warn!("Failed to read latest snapshot, refreshing instead: {}", e);
            None
        }
    };

    let now = Utc::now();
    let window = config.freshness_window();
    if let Some(snapshot) =
        latest.filter(|s| freshness::use_cached(Some(s.timestamp), now, window))
    {
        info!("Serving cached snapshot from {}", snapshot.timestamp);
        return Ok(format_snapshot(&snapshot));
    }

    refresh(pool, provider, config).await
}

/// Fetch a fresh quote, append it to the store (snapshot plus chart point in
/// one transaction) and return the formatted result.
pub async fn refresh(
    pool: &SqlitePool,
    provider: &dyn QuoteProvider,
    config: &AppConfig,
) -> Result<CurrentData, AppError> {
    // The one place source failures are absorbed: a provider error downgrades
    // to the fixed paper values instead of failing the request.
    let quote = match provider.fetch_quote(&config.symbol).await {
        Ok(quote) => quote,
        Err(e) => {
            warn!("⚠️ Quote source unavailable, serving fixed quote: {}", e);
            paper::fallback_quote(&config.symbol)
        }
    };
    let pair = match provider.fetch_0dte_pair(&config.symbol, quote.last_price).await {
        Ok(pair) => pair,
        Err(e) => {
            warn!("⚠️ Option source unavailable, serving fixed legs: {}", e);
            paper::fallback_pair()
        }
    };

    let (snapshot, point) = build_records(&quote, &pair);
    db::snapshot_queries::insert_with_point(pool, &snapshot, &point).await?;
    info!(
        "✓ Stored new {} snapshot: {} at {}",
        config.symbol, snapshot.last_trade, snapshot.timestamp
    );

    Ok(format_snapshot(&snapshot))
}

/// Latest stored snapshot, without touching the quote source.
pub async fn get_latest(pool: &SqlitePool) -> Result<CurrentData, AppError> {
    db::snapshot_queries::fetch_latest(pool)
        .await?
        .map(|snapshot| format_snapshot(&snapshot))
        .ok_or_else(|| AppError::NotFound("no market data recorded yet".to_string()))
}

/// Total stored rows: snapshots plus chart points, the two tables each
/// refresh writes.
pub async fn data_count(pool: &SqlitePool) -> Result<i64, AppError> {
    let snapshots = db::snapshot_queries::count(pool).await?;
    let points = db::chart_point_queries::count(pool).await?;
    Ok(snapshots + points)
}

/// Stand-in count for when the store cannot answer: 100 plus the wall clock
/// mod 50, always within [100, 149].
pub fn synthetic_count(now: DateTime<Utc>) -> i64 {
    100 + now.timestamp().rem_euclid(50)
}

fn build_records(quote: &EquityQuote, pair: &ZeroDtePair) -> (QuoteSnapshot, ChartPoint) {
    // Simplified on purpose: without intraday tick history, session VWAP and
    // MA9 track the last trade.
    let session_vwap = quote.last_price;
    let ma9 = quote.last_price;

    let snapshot = QuoteSnapshot {
        id: Uuid::new_v4(),
        symbol: quote.symbol.clone(),
        timestamp: quote.timestamp,
        last_trade: quote.last_price,
        bid: Some(quote.bid),
        ask: Some(quote.ask),
        session_vwap: Some(session_vwap),
        ma9: Some(ma9),
        nearest_strike: Some(pair.nearest_strike),
        call_bid: Some(pair.call.bid),
        call_ask: Some(pair.call.ask),
        put_bid: Some(pair.put.bid),
        put_ask: Some(pair.put.ask),
    };
    let point = ChartPoint {
        id: Uuid::new_v4(),
        timestamp: quote.timestamp,
        price: quote.last_price,
        vwap: Some(session_vwap),
        ma9: Some(ma9),
        kind: "price".to_string(),
    };

    (snapshot, point)
}

pub(crate) fn format_snapshot(snapshot: &QuoteSnapshot) -> CurrentData {
    CurrentData {
        timestamp: snapshot.timestamp.to_rfc3339(),
        last_trade: round2(snapshot.last_trade),
        session_vwap: snapshot.session_vwap.map(round2),
        ma9: snapshot.ma9.map(round2),
        nearest_strike: snapshot.nearest_strike.map(round2),
        call_bid: snapshot.call_bid.map(round2),
        call_ask: snapshot.call_ask.map(round2),
        put_bid: snapshot.put_bid.map(round2),
        put_ask: snapshot.put_ask.map(round2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Duration;
    use sqlx::sqlite::SqlitePoolOptions;

    use crate::external::paper::PaperQuoteProvider;
    use crate::external::quote_provider::QuoteProviderError;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();
        pool
    }

    fn test_config() -> AppConfig {
        AppConfig {
            symbol: "QQQ".to_string(),
            port: 8000,
            database_url: "sqlite::memory:".to_string(),
            freshness_window_secs: 60,
        }
    }

    fn paper_provider() -> PaperQuoteProvider {
        PaperQuoteProvider::new(None, None)
    }

    struct FailingProvider;

    #[async_trait]
    impl QuoteProvider for FailingProvider {
        async fn fetch_quote(&self, _symbol: &str) -> Result<EquityQuote, QuoteProviderError> {
            Err(QuoteProviderError::Unavailable("connection refused".to_string()))
        }

        async fn fetch_0dte_pair(
            &self,
            _symbol: &str,
            _last_price: f64,
        ) -> Result<ZeroDtePair, QuoteProviderError> {
            Err(QuoteProviderError::Unavailable("connection refused".to_string()))
        }
    }

    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl QuoteProvider for CountingProvider {
        async fn fetch_quote(&self, symbol: &str) -> Result<EquityQuote, QuoteProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(paper::fallback_quote(symbol))
        }

        async fn fetch_0dte_pair(
            &self,
            _symbol: &str,
            _last_price: f64,
        ) -> Result<ZeroDtePair, QuoteProviderError> {
            Ok(paper::fallback_pair())
        }
    }

    #[tokio::test]
    async fn test_refresh_appends_snapshot_and_point() {
        let pool = test_pool().await;
        let provider = paper_provider();

        let data = refresh(&pool, &provider, &test_config()).await.unwrap();

        assert_eq!(db::snapshot_queries::count(&pool).await.unwrap(), 1);
        assert_eq!(db::chart_point_queries::count(&pool).await.unwrap(), 1);
        assert!(data.last_trade > 0.0);
        assert!(data.nearest_strike.is_some());
    }

    #[tokio::test]
    async fn test_get_current_serves_cached_within_window() {
        let pool = test_pool().await;
        let provider = paper_provider();
        let config = test_config();

        let first = get_current(&pool, &provider, &config).await.unwrap();
        let second = get_current(&pool, &provider, &config).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(db::snapshot_queries::count(&pool).await.unwrap(), 1);
        assert_eq!(db::chart_point_queries::count(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_current_refreshes_when_stale() {
        let pool = test_pool().await;
        let provider = paper_provider();
        let config = test_config();

        // Plant a snapshot older than the freshness window.
        let stale_quote = paper::fallback_quote("QQQ");
        let (mut snapshot, mut point) = build_records(&stale_quote, &paper::fallback_pair());
        let old = Utc::now() - Duration::seconds(120);
        snapshot.timestamp = old;
        point.timestamp = old;
        db::snapshot_queries::insert_with_point(&pool, &snapshot, &point)
            .await
            .unwrap();

        get_current(&pool, &provider, &config).await.unwrap();

        assert_eq!(db::snapshot_queries::count(&pool).await.unwrap(), 2);
        assert_eq!(db::chart_point_queries::count(&pool).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_failed_latest_read_falls_through_to_refresh() {
        let pool = test_pool().await;
        pool.close().await;

        let provider = CountingProvider::default();
        let err = get_current(&pool, &provider, &test_config()).await.unwrap_err();

        // The unreadable store counts as empty: the quote source is still
        // consulted, and only the append surfaces the store error.
        assert!(matches!(err, AppError::Db(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_survives_provider_failure() {
        let pool = test_pool().await;
        let config = test_config();

        let data = refresh(&pool, &FailingProvider, &config).await.unwrap();

        // The fixed paper values stand in for the unavailable source.
        assert_eq!(data.last_trade, 245.0);
        assert_eq!(data.nearest_strike, Some(245.0));
        assert_eq!(data.call_bid, Some(1.23));
        assert_eq!(data.call_ask, Some(1.27));
        assert_eq!(data.put_bid, Some(1.15));
        assert_eq!(data.put_ask, Some(1.19));
        assert_eq!(db::snapshot_queries::count(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_latest_reports_missing_data() {
        let pool = test_pool().await;

        let err = get_latest(&pool).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        refresh(&pool, &paper_provider(), &test_config())
            .await
            .unwrap();
        assert!(get_latest(&pool).await.is_ok());
    }

    #[tokio::test]
    async fn test_data_count_sums_both_tables() {
        let pool = test_pool().await;
        let provider = paper_provider();
        let config = test_config();

        assert_eq!(data_count(&pool).await.unwrap(), 0);

        refresh(&pool, &provider, &config).await.unwrap();
        refresh(&pool, &provider, &config).await.unwrap();

        assert_eq!(data_count(&pool).await.unwrap(), 4);
    }

    #[test]
    fn test_synthetic_count_stays_in_band() {
        let now = Utc::now();
        let count = synthetic_count(now);

        assert!((100..=149).contains(&count));
        assert_eq!(count, 100 + now.timestamp() % 50);
    }

    #[test]
    fn test_format_snapshot_rounds_to_two_decimals() {
        let quote = EquityQuote {
            symbol: "QQQ".to_string(),
            last_price: 245.6789,
            bid: 245.644,
            ask: 245.712,
            timestamp: Utc::now(),
        };
        let (mut snapshot, _) = build_records(&quote, &paper::fallback_pair());
        snapshot.call_bid = Some(1.2349);

        let data = format_snapshot(&snapshot);

        assert_eq!(data.last_trade, 245.68);
        assert_eq!(data.session_vwap, Some(245.68));
        assert_eq!(data.call_bid, Some(1.23));
    }
}
