//! Explorer Module
//!
//! Thin client over the LitecoinSpace REST API (Esplora-compatible):
//!
//! - `GET /address/{addr}`             - address funding statistics
//! - `GET /address/{addr}/utxo`        - unspent outputs
//! - `GET /address/{addr}/txs?limit=N` - transaction history, most recent first
//! - `GET /tx/{txid}`                  - full transaction
//! - `GET /tx/{txid}/status`           - confirmation status
//! - `GET /blocks/tip/height`          - chain tip (confirmation arithmetic)
//!
//! ## Components
//!
//! - **transport**: `HttpTransport` seam and the reqwest implementation
//! - **cache**: per-client response cache with wholesale periodic flush
//! - **client**: `ExplorerClient`, status/JSON handling and the two result layers
//! - **types**: typed API payloads

pub mod cache;
pub mod client;
pub mod transport;
pub mod types;

// Re-exports
pub use cache::{CacheKey, EntityKind, ExplorerCache, DEFAULT_FLUSH_INTERVAL};
pub use client::{
    ExplorerClient, ExplorerError, ExplorerResult, DEFAULT_TIMEOUT, MAINNET_URL, TESTNET_URL,
};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
pub use types::{AddressInfo, AddressStats, Transaction, TxInput, TxOutput, TxStatus, Utxo};
