//! LTC/USD price quote with hourly caching.
//!
//! The rate never fails: a failed refresh serves the last good quote, or the
//! fallback when no quote was ever fetched. Failed refreshes do not restart
//! the TTL, so the next call tries again.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::common::ServiceConfig;
use crate::explorer::{ExplorerError, HttpTransport, ReqwestTransport};

pub const COINGECKO_LTC_USD_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=litecoin&vs_currencies=usd";

/// Served until the first successful fetch
pub const DEFAULT_FALLBACK_RATE: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

pub const DEFAULT_RATE_TTL: Duration = Duration::from_secs(3600);

pub const DEFAULT_PRICE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct SimplePrice {
    litecoin: CoinQuote,
}

#[derive(Debug, Deserialize)]
struct CoinQuote {
    /// Taken from the JSON digits as written, never through f64
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    usd: Decimal,
}

#[derive(Debug)]
struct RateState {
    rate: Decimal,
    fetched_at: Option<Instant>,
}

/// Cached LTC/USD quote source
pub struct RateOracle {
    transport: Arc<dyn HttpTransport>,
    url: String,
    ttl: Duration,
    timeout: Duration,
    state: RwLock<RateState>,
}

impl std::fmt::Debug for RateOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateOracle")
            .field("url", &self.url)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl RateOracle {
    /// CoinGecko-backed oracle with default TTL and fallback
    pub fn coingecko() -> Self {
        Self::with_transport(COINGECKO_LTC_USD_URL, Arc::new(ReqwestTransport::new()))
    }

    /// Oracle configured from the environment-derived service settings
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::with_transport(&config.price_url, Arc::new(ReqwestTransport::new()))
            .with_ttl(config.rate_ttl)
            .with_timeout(config.price_timeout)
            .with_fallback(config.fallback_rate)
    }

    pub fn with_transport(url: &str, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            url: url.to_string(),
            ttl: DEFAULT_RATE_TTL,
            timeout: DEFAULT_PRICE_TIMEOUT,
            state: RwLock::new(RateState {
                rate: DEFAULT_FALLBACK_RATE,
                fetched_at: None,
            }),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_fallback(self, rate: Decimal) -> Self {
        Self {
            state: RwLock::new(RateState {
                rate,
                fetched_at: None,
            }),
            ..self
        }
    }

    /// Current LTC/USD rate
    pub async fn get_ltc_usd_rate(&self) -> Decimal {
        {
            let state = self.state.read().await;
            if let Some(fetched_at) = state.fetched_at {
                if fetched_at.elapsed() < self.ttl {
                    return state.rate;
                }
            }
        }

        match self.fetch_rate().await {
            Ok(rate) => {
                let mut state = self.state.write().await;
                state.rate = rate;
                state.fetched_at = Some(Instant::now());
                info!(%rate, "LTC/USD rate refreshed");
                rate
            }
            Err(e) => {
                error!("Error getting LTC/USD rate: {}", e);
                self.state.read().await.rate
            }
        }
    }

    /// Last known rate and whether it is still within the TTL
    pub async fn cached_rate(&self) -> (Decimal, bool) {
        let state = self.state.read().await;
        let fresh = state
            .fetched_at
            .map(|at| at.elapsed() < self.ttl)
            .unwrap_or(false);
        (state.rate, fresh)
    }

    /// Convert an LTC amount to USD at the current rate, rounded to cents
    pub async fn ltc_to_usd(&self, amount_ltc: Decimal) -> Decimal {
        (amount_ltc * self.get_ltc_usd_rate().await).round_dp(2)
    }

    async fn fetch_rate(&self) -> Result<Decimal, ExplorerError> {
        let resp = self.transport.get(&self.url, self.timeout).await?;
        if resp.status != 200 {
            return Err(ExplorerError::Status {
                status: resp.status,
                url: self.url.clone(),
            });
        }

        let quote: SimplePrice = serde_json::from_str(&resp.body)
            .map_err(|e| ExplorerError::Decode(format!("price quote: {}", e)))?;

        let rate = quote.litecoin.usd;
        if rate.is_sign_negative() || rate.is_zero() {
            return Err(ExplorerError::Decode(format!("invalid rate: {}", rate)));
        }
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::transport::{HttpResponse, MockHttpTransport};
    use rust_decimal_macros::dec;

    const URL: &str = "http://price.test/simple/price";

    fn oracle(mock: MockHttpTransport) -> RateOracle {
        RateOracle::with_transport(URL, Arc::new(mock))
    }

    #[test]
    fn test_fallback_constant() {
        assert_eq!(DEFAULT_FALLBACK_RATE, dec!(50));
    }

    #[tokio::test]
    async fn test_rate_is_cached_within_ttl() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get()
            .times(1)
            .returning(|_, _| Ok(HttpResponse::new(200, r#"{"litecoin":{"usd":84.25}}"#)));

        let oracle = oracle(mock);
        assert_eq!(oracle.get_ltc_usd_rate().await, dec!(84.25));
        assert_eq!(oracle.get_ltc_usd_rate().await, dec!(84.25));
        assert_eq!(oracle.cached_rate().await, (dec!(84.25), true));
    }

    #[tokio::test]
    async fn test_unreachable_uses_fallback() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get()
            .returning(|url, _| Err(ExplorerError::Timeout(url.to_string())));

        let oracle = oracle(mock);
        assert_eq!(oracle.get_ltc_usd_rate().await, dec!(50));
        assert_eq!(oracle.cached_rate().await, (dec!(50), false));
    }

    #[tokio::test]
    async fn test_custom_fallback() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get()
            .returning(|_, _| Ok(HttpResponse::new(503, "busy")));

        let oracle = oracle(mock).with_fallback(dec!(65));
        assert_eq!(oracle.get_ltc_usd_rate().await, dec!(65));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_last_good_rate() {
        let mut mock = MockHttpTransport::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(HttpResponse::new(200, r#"{"litecoin":{"usd":72.5}}"#)));
        mock.expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(HttpResponse::new(500, "down")));

        // zero TTL forces a refresh on every call
        let oracle = oracle(mock).with_ttl(Duration::ZERO);
        assert_eq!(oracle.get_ltc_usd_rate().await, dec!(72.5));
        assert_eq!(oracle.get_ltc_usd_rate().await, dec!(72.5));
    }

    #[tokio::test]
    async fn test_malformed_quote_uses_fallback() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get()
            .returning(|_, _| Ok(HttpResponse::new(200, r#"{"bitcoin":{"usd":1}}"#)));

        let oracle = oracle(mock);
        assert_eq!(oracle.get_ltc_usd_rate().await, dec!(50));
    }

    #[tokio::test]
    async fn test_quote_keeps_every_digit() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get().returning(|_, _| {
            Ok(HttpResponse::new(
                200,
                r#"{"litecoin":{"usd":84.123456789012345678}}"#,
            ))
        });

        let oracle = oracle(mock);
        assert_eq!(oracle.get_ltc_usd_rate().await, dec!(84.123456789012345678));
    }

    #[tokio::test]
    async fn test_non_positive_quote_uses_fallback() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get()
            .returning(|_, _| Ok(HttpResponse::new(200, r#"{"litecoin":{"usd":0}}"#)));

        let oracle = oracle(mock);
        assert_eq!(oracle.get_ltc_usd_rate().await, dec!(50));
    }

    #[tokio::test]
    async fn test_ltc_to_usd() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get()
            .returning(|_, _| Ok(HttpResponse::new(200, r#"{"litecoin":{"usd":80}}"#)));

        let oracle = oracle(mock);
        assert_eq!(oracle.ltc_to_usd(dec!(1.5)).await, dec!(120));
    }
}
