//! Deposit Storage
//!
//! `DepositStore` is the seam between the reconciliation loop and persistence.

pub mod memory;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use memory::MemoryDepositStore;
pub use sqlite::SqliteDepositStore;
pub use traits::{DepositStore, StorageError, StorageResult};
pub use types::{DepositStatus, PendingDeposit};

#[cfg(test)]
pub use traits::MockDepositStore;
