use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use tracing::{info, warn};

use crate::external::quote_provider::{
    EquityQuote, OptionQuote, QuoteProvider, QuoteProviderError, ZeroDtePair, REFERENCE_PRICE,
};
use crate::utils::round2;

/// Simulated brokerage. Generates plausible numbers around
/// [`REFERENCE_PRICE`] instead of calling a live API; broker credentials are
/// read so a real client can slot in later, but the same paper data is served
/// either way.
pub struct PaperQuoteProvider {
    api_key: Option<String>,
    api_secret: Option<String>,
}

impl PaperQuoteProvider {
    pub fn new(api_key: Option<String>, api_secret: Option<String>) -> Self {
        Self {
            api_key,
            api_secret,
        }
    }

    /// Read broker credentials from the environment. Both absent is paper
    /// mode; a half-set pair is an env typo worth failing on at startup.
    pub fn from_env() -> Result<Self, QuoteProviderError> {
        let api_key = std::env::var("BROKER_API_KEY").ok();
        let api_secret = std::env::var("BROKER_API_SECRET").ok();
        check_credentials(&api_key, &api_secret)?;

        if api_key.is_none() && api_secret.is_none() {
            info!("Broker credentials not configured - running in paper mode");
        }
        Ok(Self::new(api_key, api_secret))
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some() && self.api_secret.is_some()
    }
}

fn check_credentials(
    api_key: &Option<String>,
    api_secret: &Option<String>,
) -> Result<(), QuoteProviderError> {
    match (api_key, api_secret) {
        (Some(_), None) => Err(QuoteProviderError::Unavailable(
            "BROKER_API_KEY is set but BROKER_API_SECRET is missing".to_string(),
        )),
        (None, Some(_)) => Err(QuoteProviderError::Unavailable(
            "BROKER_API_SECRET is set but BROKER_API_KEY is missing".to_string(),
        )),
        _ => Ok(()),
    }
}

#[async_trait]
impl QuoteProvider for PaperQuoteProvider {
    async fn fetch_quote(&self, symbol: &str) -> Result<EquityQuote, QuoteProviderError> {
        let mut rng = rand::rng();

        let last_price = round2(REFERENCE_PRICE + rng.random_range(-2.0..2.0));
        let spread = rng.random_range(0.02..0.08);

        Ok(EquityQuote {
            symbol: symbol.to_string(),
            last_price,
            bid: round2(last_price - spread / 2.0),
            ask: round2(last_price + spread / 2.0),
            timestamp: Utc::now(),
        })
    }

    async fn fetch_0dte_pair(
        &self,
        _symbol: &str,
        last_price: f64,
    ) -> Result<ZeroDtePair, QuoteProviderError> {
        let mut rng = rand::rng();
        let nearest_strike = last_price.round();

        // Small ladder around the money, one call and one put per strike.
        let mut calls = Vec::new();
        let mut puts = Vec::new();
        for offset in -2i32..=2 {
            let strike = nearest_strike + f64::from(offset);
            calls.push(make_leg(&mut rng, strike, (last_price - strike).max(0.0)));
            puts.push(make_leg(&mut rng, strike, (strike - last_price).max(0.0)));
        }

        let call = calls.iter().find(|leg| leg.strike == nearest_strike);
        let put = puts.iter().find(|leg| leg.strike == nearest_strike);

        match (call, put) {
            (Some(call), Some(put)) => Ok(ZeroDtePair {
                nearest_strike,
                call: call.clone(),
                put: put.clone(),
            }),
            _ => {
                // A ladder that misses the near strike degrades to the fixed
                // legs instead of failing the request.
                warn!("0DTE ladder missing strike {}; serving fixed legs", nearest_strike);
                Ok(fallback_pair())
            }
        }
    }
}

fn make_leg(rng: &mut impl Rng, strike: f64, intrinsic: f64) -> OptionQuote {
    let mid = intrinsic + 1.10 + rng.random_range(-0.25..0.25);
    let spread = rng.random_range(0.02..0.08);

    OptionQuote {
        strike,
        bid: round2(mid - spread / 2.0),
        ask: round2(mid + spread / 2.0),
    }
}

/// Fixed quote served when the source cannot produce one.
pub fn fallback_quote(symbol: &str) -> EquityQuote {
    EquityQuote {
        symbol: symbol.to_string(),
        last_price: REFERENCE_PRICE,
        bid: REFERENCE_PRICE - 0.05,
        ask: REFERENCE_PRICE + 0.05,
        timestamp: Utc::now(),
    }
}

/// Fixed near-the-money pair served when the source or leg matching fails.
pub fn fallback_pair() -> ZeroDtePair {
    ZeroDtePair {
        nearest_strike: REFERENCE_PRICE,
        call: OptionQuote {
            strike: REFERENCE_PRICE,
            bid: 1.23,
            ask: 1.27,
        },
        put: OptionQuote {
            strike: REFERENCE_PRICE,
            bid: 1.15,
            ask: 1.19,
        },
    }
}
