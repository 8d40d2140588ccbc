//! Environment-based Configuration
//!
//! All settings come from environment variables (a `.env` file is loaded by the
//! binary when present). Every variable has a default, so an empty environment
//! yields a working mainnet configuration.
//!
//! # Environment Variables
//!
//! ## Network
//! - `LTC_NETWORK` - "mainnet" or "testnet" (default: "mainnet")
//! - `LTC_EXPLORER_URL` - LitecoinSpace API base URL (default: per network)
//! - `LTC_PRICE_URL` - Price quote endpoint (default: CoinGecko simple price)
//!
//! ## Reconciliation
//! - `LTC_REQUIRED_CONFIRMATIONS` - Confirmations before a deposit is credited (default: 3)
//! - `LTC_POLL_INTERVAL_SECS` - Pause between reconciliation passes, at least 1 (default: 60)
//! - `LTC_CACHE_FLUSH_SECS` - Explorer cache flush interval (default: 600)
//!
//! ## Price quote
//! - `LTC_RATE_TTL_SECS` - How long a fetched rate is served from cache (default: 3600)
//! - `LTC_FALLBACK_RATE` - Rate used when no quote was ever fetched (default: 50)
//!
//! ## Timeouts
//! - `LTC_EXPLORER_TIMEOUT_SECS` - Explorer request timeout (default: 30)
//! - `LTC_PRICE_TIMEOUT_SECS` - Price request timeout (default: 10)
//!
//! ## Service
//! - `LTC_DB_PATH` - SQLite database path (default: "data/deposits.db")
//! - `LTC_API_PORT` - REST API port (default: 3002)
//! - `LTC_LOG_LEVEL` - Logging level (debug, info, warn, error)

use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::explorer::{MAINNET_URL, TESTNET_URL};
use crate::rates::{COINGECKO_LTC_USD_URL, DEFAULT_FALLBACK_RATE};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Litecoin network the explorer is queried on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            _ => Err(ConfigError::InvalidValue(
                "LTC_NETWORK".to_string(),
                format!("unknown network: {}", s),
            )),
        }
    }
}

impl Network {
    /// Default LitecoinSpace API for this network
    pub fn default_explorer_api(&self) -> &'static str {
        match self {
            Network::Mainnet => MAINNET_URL,
            Network::Testnet => TESTNET_URL,
        }
    }
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub network: Network,
    pub explorer_url: String,
    pub price_url: String,
    pub required_confirmations: u32,
    pub poll_interval: Duration,
    pub cache_flush_interval: Duration,
    pub rate_ttl: Duration,
    pub fallback_rate: Decimal,
    pub explorer_timeout: Duration,
    pub price_timeout: Duration,
    pub db_path: String,
    pub api_port: u16,
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            network: Network::Mainnet,
            explorer_url: MAINNET_URL.to_string(),
            price_url: COINGECKO_LTC_USD_URL.to_string(),
            required_confirmations: 3,
            poll_interval: Duration::from_secs(60),
            cache_flush_interval: Duration::from_secs(600),
            rate_ttl: Duration::from_secs(3600),
            fallback_rate: DEFAULT_FALLBACK_RATE,
            explorer_timeout: Duration::from_secs(30),
            price_timeout: Duration::from_secs(10),
            db_path: "data/deposits.db".to_string(),
            api_port: 3002,
            log_level: "info".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let network: Network = match lookup("LTC_NETWORK") {
            Some(value) => value.parse()?,
            None => defaults.network,
        };

        let explorer_url = lookup("LTC_EXPLORER_URL")
            .unwrap_or_else(|| network.default_explorer_api().to_string());
        let price_url = lookup("LTC_PRICE_URL").unwrap_or(defaults.price_url);

        let required_confirmations = parse_or(
            &lookup,
            "LTC_REQUIRED_CONFIRMATIONS",
            defaults.required_confirmations,
        )?;

        let poll_interval = secs_or(&lookup, "LTC_POLL_INTERVAL_SECS", defaults.poll_interval)?;
        if poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue(
                "LTC_POLL_INTERVAL_SECS".to_string(),
                "interval must be at least one second".to_string(),
            ));
        }
        let cache_flush_interval =
            secs_or(&lookup, "LTC_CACHE_FLUSH_SECS", defaults.cache_flush_interval)?;
        let rate_ttl = secs_or(&lookup, "LTC_RATE_TTL_SECS", defaults.rate_ttl)?;
        let explorer_timeout =
            secs_or(&lookup, "LTC_EXPLORER_TIMEOUT_SECS", defaults.explorer_timeout)?;
        let price_timeout = secs_or(&lookup, "LTC_PRICE_TIMEOUT_SECS", defaults.price_timeout)?;

        let fallback_rate = parse_or(&lookup, "LTC_FALLBACK_RATE", defaults.fallback_rate)?;
        if fallback_rate.is_sign_negative() {
            return Err(ConfigError::InvalidValue(
                "LTC_FALLBACK_RATE".to_string(),
                "rate cannot be negative".to_string(),
            ));
        }

        let db_path = lookup("LTC_DB_PATH").unwrap_or(defaults.db_path);
        let api_port = parse_or(&lookup, "LTC_API_PORT", defaults.api_port)?;
        let log_level = lookup("LTC_LOG_LEVEL").unwrap_or(defaults.log_level);

        Ok(Self {
            network,
            explorer_url,
            price_url,
            required_confirmations,
            poll_interval,
            cache_flush_interval,
            rate_ttl,
            fallback_rate,
            explorer_timeout,
            price_timeout,
            db_path,
            api_port,
            log_level,
        })
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        println!("=== LTC Payments Configuration ===");
        println!("Network: {:?}", self.network);
        println!("Explorer API: {}", self.explorer_url);
        println!("Price API: {}", self.price_url);
        println!("Required Confirmations: {}", self.required_confirmations);
        println!("Poll Interval: {} seconds", self.poll_interval.as_secs());
        println!("Cache Flush: {} seconds", self.cache_flush_interval.as_secs());
        println!("Rate TTL: {} seconds", self.rate_ttl.as_secs());
        println!("Database: {}", self.db_path);
        println!("Log Level: {}", self.log_level);
        println!("==================================");
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            ConfigError::InvalidValue(name.to_string(), format!("cannot parse '{}'", raw))
        }),
        None => Ok(default),
    }
}

fn secs_or<F>(lookup: &F, name: &str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    parse_or(lookup, name, default.as_secs()).map(Duration::from_secs)
}
