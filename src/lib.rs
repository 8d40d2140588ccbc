//! LTC Payments - Litecoin payment detection and deposit reconciliation
//!
//! Built on the LitecoinSpace (Esplora-compatible) REST API.
//!
//! ## Components
//!
//! 1. **Explorer Client** - Cached access to address, UTXO and transaction data
//! 2. **Payment Matcher** - "Has address X received amount Y yet?"
//! 3. **Deposit Monitor** - Background loop that credits deposits once confirmed
//! 4. **Rate Oracle** - Hourly cached LTC/USD quote with a fixed fallback
//!
//! Deposits and user balances live behind the `DepositStore` trait (SQLite in
//! production, in-memory for tests).

pub mod api;
pub mod common;
pub mod deposit_tracker;
pub mod explorer;
pub mod payment;
pub mod rates;
pub mod storage;
pub mod units;

// Re-exports: Infrastructure
pub use common::{
    init_from_config, init_logging, log_transaction_event, ConfigError, LogLevel, Network,
    PaymentsError, ServiceConfig, TransactionEvent,
};

// Re-exports: Explorer
pub use explorer::{
    AddressInfo, ExplorerClient, ExplorerError, HttpResponse, HttpTransport, ReqwestTransport,
    Transaction, TxStatus, Utxo, MAINNET_URL, TESTNET_URL,
};

// Re-exports: Payments
pub use payment::{PaymentCheckResult, PaymentError, PaymentMatcher};
pub use rates::RateOracle;

// Re-exports: Deposits
pub use deposit_tracker::{
    CycleReport, DepositMonitor, DepositOutcome, TrackerConfig, TrackerError, TrackerStats,
};
pub use storage::{
    DepositStatus, DepositStore, MemoryDepositStore, PendingDeposit, SqliteDepositStore,
    StorageError,
};
