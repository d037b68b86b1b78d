//! ETH/USD exchange rate used to price donations.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use moka::future::Cache;
use tracing::{debug, error, instrument};

use crate::error::ServiceError;

/// Default CryptoCompare endpoint for single-symbol prices
pub const CRYPTOCOMPARE_PRICE_URL: &str = "https://min-api.cryptocompare.com/data/price";

/// Source of the ETH price in USD
#[mockall::automock]
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// USD per 1 ETH
    async fn eth_usd(&self) -> Result<f64, ServiceError>;
}

/// Rate fixed by configuration, for local chains and tests
#[derive(Debug, Clone)]
pub struct FixedPriceFeed {
    rate: f64,
}

impl FixedPriceFeed {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

#[async_trait]
impl PriceFeed for FixedPriceFeed {
    async fn eth_usd(&self) -> Result<f64, ServiceError> {
        Ok(self.rate)
    }
}

/// CryptoCompare price API client
///
/// Quotes are cached for a short time so that rendering a page of fundraiser
/// cards costs a single upstream request.
#[derive(Clone)]
pub struct CryptoComparePriceFeed {
    /// HTTP client shared by all requests
    client: reqwest::Client,
    /// Price endpoint, queried with `fsym=ETH&tsyms=USD`
    url: String,
    /// Last quote, keyed by unit
    cache: Cache<(), f64>,
}

impl CryptoComparePriceFeed {
    /// Creates a feed that keeps each quote for `ttl`
    pub fn new(url: &str, ttl: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    /// Query the upstream API, bypassing the cache
    async fn fetch(&self) -> Result<f64, ServiceError> {
        debug!("Fetching ETH/USD from {}", self.url);
        let prices: HashMap<String, f64> = self
            .client
            .get(&self.url)
            .query(&[("fsym", "ETH"), ("tsyms", "USD")])
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| ServiceError::ExchangeRateError(e.to_string()))?
            .json()
            .await
            .map_err(|e| ServiceError::ExchangeRateError(format!("Malformed price response: {}", e)))?;

        parse_usd_quote(&prices)
    }
}

/// Extract a positive USD quote from a `{"USD": 1234.5}` response
pub fn parse_usd_quote(prices: &HashMap<String, f64>) -> Result<f64, ServiceError> {
    match prices.get("USD") {
        Some(rate) if rate.is_finite() && *rate > 0.0 => Ok(*rate),
        Some(rate) => Err(ServiceError::ExchangeRateError(format!(
            "Unusable USD quote: {}",
            rate
        ))),
        None => Err(ServiceError::ExchangeRateError(
            "USD quote missing from response".to_string(),
        )),
    }
}

#[async_trait]
impl PriceFeed for CryptoComparePriceFeed {
    #[instrument(skip(self))]
    async fn eth_usd(&self) -> Result<f64, ServiceError> {
        self.cache
            .try_get_with((), self.fetch())
            .await
            .map_err(|e| {
                error!("Exchange rate fetch error: {}", e);
                (*e).clone()
            })
    }
}
