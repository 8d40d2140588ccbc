//! LitecoinSpace Explorer Client
//!
//! Fetches address info, UTXOs, transactions and transaction status from an
//! Esplora-compatible REST API and memoizes successful responses until the
//! next cache flush.
//!
//! Two layers are exposed:
//! - `fetch_*` returns `Result<T, ExplorerError>` so callers can tell
//!   "not found" from "API unreachable"
//! - `get_*` degrades every failure to `None` after logging it
//!
//! No retries happen here; the reconciliation loop's polling cadence is the
//! retry mechanism.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

use super::cache::{CacheKey, EntityKind, ExplorerCache};
use super::transport::{HttpTransport, ReqwestTransport};
use super::types::{AddressInfo, Transaction, TxStatus, Utxo};
use crate::common::ServiceConfig;

/// LitecoinSpace API endpoints
pub const MAINNET_URL: &str = "https://litecoinspace.org/api";
pub const TESTNET_URL: &str = "https://litecoinspace.org/testnet/api";

/// Default explorer request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Characters escaped inside a single URL path segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Explorer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExplorerError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("malformed payload: {0}")]
    Decode(String),
}

impl ExplorerError {
    /// Errors that may succeed on a later poll
    pub fn is_transient(&self) -> bool {
        match self {
            ExplorerError::Timeout(_) | ExplorerError::Transport(_) => true,
            ExplorerError::Status { status, .. } => *status >= 500 || *status == 429,
            ExplorerError::NotFound(_) | ExplorerError::Decode(_) => false,
        }
    }
}

pub type ExplorerResult<T> = Result<T, ExplorerError>;

/// Explorer HTTP client with a per-instance response cache
pub struct ExplorerClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    timeout: Duration,
    cache: ExplorerCache,
}

impl std::fmt::Debug for ExplorerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplorerClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ExplorerClient {
    /// Create a client with custom URL
    pub fn new(base_url: &str) -> Self {
        Self::with_transport(base_url, Arc::new(ReqwestTransport::new()))
    }

    /// Create a client for Litecoin mainnet
    pub fn mainnet() -> Self {
        Self::new(MAINNET_URL)
    }

    /// Create a client for Litecoin testnet
    pub fn testnet() -> Self {
        Self::new(TESTNET_URL)
    }

    /// Create a client from service configuration
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(&config.explorer_url)
            .with_timeout(config.explorer_timeout)
            .with_flush_interval(config.cache_flush_interval)
    }

    /// Create a client over an arbitrary transport
    pub fn with_transport(base_url: &str, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            cache: ExplorerCache::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.cache = ExplorerCache::new(interval);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &ExplorerCache {
        &self.cache
    }

    /// Flush the response cache if the flush interval has elapsed
    pub async fn flush_cache_if_due(&self) -> bool {
        self.cache.flush_if_due().await
    }

    /// Flush the response cache unconditionally
    pub async fn flush_cache(&self) {
        self.cache.flush().await;
    }

    // =========================================================================
    // Result layer
    // =========================================================================

    pub async fn fetch_address_info(&self, address: &str) -> ExplorerResult<AddressInfo> {
        self.fetch_cached(
            CacheKey::new(EntityKind::Address, address),
            &format!("/address/{}", segment(address)),
        )
        .await
    }

    pub async fn fetch_address_utxo(&self, address: &str) -> ExplorerResult<Vec<Utxo>> {
        self.fetch_cached(
            CacheKey::new(EntityKind::Utxo, address),
            &format!("/address/{}/utxo", segment(address)),
        )
        .await
    }

    pub async fn fetch_transaction(&self, txid: &str) -> ExplorerResult<Transaction> {
        self.fetch_cached(
            CacheKey::new(EntityKind::Transaction, txid),
            &format!("/tx/{}", segment(txid)),
        )
        .await
    }

    /// Transactions touching `address`, most recent first
    ///
    /// `limit == 0` means "whatever the API returns"; otherwise the list is
    /// also truncated locally since Esplora servers may ignore the parameter.
    pub async fn fetch_address_transactions(
        &self,
        address: &str,
        limit: usize,
    ) -> ExplorerResult<Vec<Transaction>> {
        let mut endpoint = format!("/address/{}/txs", segment(address));
        if limit > 0 {
            endpoint.push_str(&format!("?limit={}", limit));
        }

        let mut txs: Vec<Transaction> = self
            .fetch_cached(
                CacheKey::new(EntityKind::AddressTxs, format!("{}?limit={}", address, limit)),
                &endpoint,
            )
            .await?;

        if limit > 0 {
            txs.truncate(limit);
        }
        Ok(txs)
    }

    /// Transaction status with `confirmations` resolved
    pub async fn fetch_transaction_status(&self, txid: &str) -> ExplorerResult<TxStatus> {
        let key = CacheKey::new(EntityKind::TxStatus, txid);
        if let Some(cached) = self.cache.get(&key).await {
            return decode(cached);
        }

        let raw = self.request_json(&format!("/tx/{}/status", segment(txid))).await?;
        let mut status: TxStatus = decode(raw)?;

        if status.confirmations.is_none() {
            let confirmations = if !status.confirmed {
                0
            } else if let Some(height) = status.block_height {
                let tip = self.fetch_tip_height().await?;
                u32::try_from(tip.saturating_sub(height).saturating_add(1)).unwrap_or(u32::MAX)
            } else {
                1
            };
            status.confirmations = Some(confirmations);
        }

        let resolved =
            serde_json::to_value(&status).map_err(|e| ExplorerError::Decode(e.to_string()))?;
        self.cache.insert(key, resolved).await;

        Ok(status)
    }

    /// Current chain tip height (never cached)
    pub async fn fetch_tip_height(&self) -> ExplorerResult<u64> {
        let url = format!("{}/blocks/tip/height", self.base_url);
        let resp = self.transport.get(&url, self.timeout).await?;
        check_status(resp.status, &url)?;

        resp.body
            .trim()
            .parse()
            .map_err(|e| ExplorerError::Decode(format!("invalid tip height: {}", e)))
    }

    // =========================================================================
    // Option layer
    // =========================================================================

    pub async fn get_address_info(&self, address: &str) -> Option<AddressInfo> {
        absorb(self.fetch_address_info(address).await)
    }

    pub async fn get_address_utxo(&self, address: &str) -> Option<Vec<Utxo>> {
        absorb(self.fetch_address_utxo(address).await)
    }

    pub async fn get_transaction(&self, txid: &str) -> Option<Transaction> {
        absorb(self.fetch_transaction(txid).await)
    }

    pub async fn get_transaction_status(&self, txid: &str) -> Option<TxStatus> {
        absorb(self.fetch_transaction_status(txid).await)
    }

    pub async fn get_address_transactions(
        &self,
        address: &str,
        limit: usize,
    ) -> Option<Vec<Transaction>> {
        absorb(self.fetch_address_transactions(address, limit).await)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn fetch_cached<T: DeserializeOwned>(
        &self,
        key: CacheKey,
        endpoint: &str,
    ) -> ExplorerResult<T> {
        if let Some(cached) = self.cache.get(&key).await {
            debug!(kind = %key.kind, id = %key.id, "Explorer cache hit");
            return decode(cached);
        }

        let raw = self.request_json(endpoint).await?;
        let typed = decode(raw.clone())?;
        self.cache.insert(key, raw).await;

        Ok(typed)
    }

    async fn request_json(&self, endpoint: &str) -> ExplorerResult<Value> {
        let url = format!("{}{}", self.base_url, endpoint);
        let resp = self.transport.get(&url, self.timeout).await?;
        check_status(resp.status, &url)?;

        serde_json::from_str(&resp.body)
            .map_err(|e| ExplorerError::Decode(format!("{}: {}", url, e)))
    }
}

fn segment(raw: &str) -> String {
    utf8_percent_encode(raw, PATH_SEGMENT).to_string()
}

fn check_status(status: u16, url: &str) -> ExplorerResult<()> {
    match status {
        200 => Ok(()),
        404 => Err(ExplorerError::NotFound(url.to_string())),
        other => Err(ExplorerError::Status {
            status: other,
            url: url.to_string(),
        }),
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> ExplorerResult<T> {
    serde_json::from_value(value).map_err(|e| ExplorerError::Decode(e.to_string()))
}

fn absorb<T>(result: ExplorerResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(ExplorerError::NotFound(url)) => {
            warn!("API endpoint not found: {}", url);
            None
        }
        Err(e) => {
            error!("API request failed: {}", e);
            None
        }
    }
}
