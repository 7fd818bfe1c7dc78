use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Price every simulated quote orbits around.
pub const REFERENCE_PRICE: f64 = 245.0;

#[derive(Debug, Clone)]
pub struct EquityQuote {
    pub symbol: String,
    pub last_price: f64,
    pub bid: f64,
    pub ask: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionQuote {
    pub strike: f64,
    pub bid: f64,
    pub ask: f64,
}

/// Matched same-day-expiry call/put pair at the strike nearest the underlying.
#[derive(Debug, Clone)]
pub struct ZeroDtePair {
    pub nearest_strike: f64,
    pub call: OptionQuote,
    pub put: OptionQuote,
}

/// Why the source cannot produce a quote. The paper source only fails on a
/// misconfigured credential pair; a live client would add network and decode
/// failures here.
#[derive(Debug, Error)]
pub enum QuoteProviderError {
    #[error("quote source unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Current quote for the underlying.
    async fn fetch_quote(&self, symbol: &str) -> Result<EquityQuote, QuoteProviderError>;

    /// 0DTE call/put pair nearest `last_price`.
    async fn fetch_0dte_pair(
        &self,
        symbol: &str,
        last_price: f64,
    ) -> Result<ZeroDtePair, QuoteProviderError>;
}
