//! Storage Trait Definitions
//!
//! The reconciliation loop and the HTTP API talk to deposits through
//! `DepositStore`. SQLite backs production; the in-memory store backs tests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::PendingDeposit;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Deposit storage interface
///
/// Implementations:
/// - `SqliteDepositStore` - Production storage with SQLite
/// - `MemoryDepositStore` - In-memory storage for testing
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DepositStore: Send + Sync {
    /// Insert a deposit, or refresh confirmations of an existing one with the same txid
    ///
    /// A confirmed deposit stays confirmed.
    async fn create_deposit(&self, deposit: &PendingDeposit) -> StorageResult<()>;

    /// Get a deposit by transaction id
    async fn get_deposit(&self, txid: &str) -> StorageResult<Option<PendingDeposit>>;

    /// All pending deposits, newest first
    async fn list_pending_deposits(&self) -> StorageResult<Vec<PendingDeposit>>;

    /// Record a confirmation count. Counts never decrease and status is untouched.
    async fn update_confirmations(&self, txid: &str, confirmations: u32) -> StorageResult<()>;

    /// Credit `amount_usd` to the user and mark the deposit confirmed, atomically
    ///
    /// Returns `false` without crediting when the deposit is already confirmed.
    async fn finalize_deposit(
        &self,
        txid: &str,
        user_id: i64,
        amount_usd: Decimal,
    ) -> StorageResult<bool>;

    /// Current balance of a user; zero for unknown users
    async fn user_balance(&self, user_id: i64) -> StorageResult<Decimal>;
}
