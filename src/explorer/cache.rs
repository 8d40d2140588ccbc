//! Explorer response cache.
//!
//! Entries never expire individually; the whole map is dropped once the flush
//! interval has elapsed. Reads vastly outnumber writes, hence the `RwLock`.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Default flush interval (10 minutes)
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(600);

/// Kind of entity an identifier refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Address,
    Utxo,
    Transaction,
    TxStatus,
    AddressTxs,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address => write!(f, "address"),
            Self::Utxo => write!(f, "utxo"),
            Self::Transaction => write!(f, "tx"),
            Self::TxStatus => write!(f, "tx_status"),
            Self::AddressTxs => write!(f, "address_txs"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: EntityKind,
    pub id: String,
}

impl CacheKey {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

#[derive(Debug)]
struct CacheState {
    entries: HashMap<CacheKey, Value>,
    last_flush: Instant,
}

/// Per-client cache of explorer payloads
#[derive(Debug)]
pub struct ExplorerCache {
    state: RwLock<CacheState>,
    flush_interval: Duration,
}

impl ExplorerCache {
    pub fn new(flush_interval: Duration) -> Self {
        Self {
            state: RwLock::new(CacheState {
                entries: HashMap::new(),
                last_flush: Instant::now(),
            }),
            flush_interval,
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Value> {
        self.state.read().await.entries.get(key).cloned()
    }

    /// Store a payload. Null, empty arrays and empty objects are not cached.
    pub async fn insert(&self, key: CacheKey, value: Value) {
        if is_empty_payload(&value) {
            return;
        }
        self.state.write().await.entries.insert(key, value);
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every entry and restart the flush epoch
    pub async fn flush(&self) {
        let mut state = self.state.write().await;
        state.entries.clear();
        state.last_flush = Instant::now();
    }

    /// Flush if the interval has elapsed since the last flush
    ///
    /// Returns whether a flush happened.
    pub async fn flush_if_due(&self) -> bool {
        let mut state = self.state.write().await;
        if state.last_flush.elapsed() < self.flush_interval {
            return false;
        }

        let dropped = state.entries.len();
        state.entries.clear();
        state.last_flush = Instant::now();
        tracing::info!(dropped, "Explorer cache flushed");
        true
    }
}

impl Default for ExplorerCache {
    fn default() -> Self {
        Self::new(DEFAULT_FLUSH_INTERVAL)
    }
}

fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache = ExplorerCache::default();
        let key = CacheKey::new(EntityKind::Address, "ltc1qa");

        cache.insert(key.clone(), json!({"chain_stats": {}})).await;

        assert_eq!(cache.get(&key).await, Some(json!({"chain_stats": {}})));
        assert_eq!(
            cache.get(&CacheKey::new(EntityKind::Utxo, "ltc1qa")).await,
            None
        );
    }

    #[tokio::test]
    async fn test_empty_payloads_not_cached() {
        let cache = ExplorerCache::default();
        cache.insert(CacheKey::new(EntityKind::Utxo, "a"), json!([])).await;
        cache.insert(CacheKey::new(EntityKind::Address, "a"), json!({})).await;
        cache.insert(CacheKey::new(EntityKind::Transaction, "a"), Value::Null).await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_flush_if_due_respects_interval() {
        let cache = ExplorerCache::new(Duration::from_secs(3600));
        cache.insert(CacheKey::new(EntityKind::Utxo, "a"), json!([1])).await;

        assert!(!cache.flush_if_due().await);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_flush_if_due_with_elapsed_interval() {
        let cache = ExplorerCache::new(Duration::ZERO);
        cache.insert(CacheKey::new(EntityKind::Utxo, "a"), json!([1])).await;

        assert!(cache.flush_if_due().await);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_explicit_flush() {
        let cache = ExplorerCache::default();
        cache.insert(CacheKey::new(EntityKind::TxStatus, "t"), json!({"confirmed": true})).await;
        cache.flush().await;
        assert!(cache.is_empty().await);
    }
}
