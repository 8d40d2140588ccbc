//! Payment Module
//!
//! Payment matching against a single address: exact-UTXO first, aggregate
//! balance fallback second. See `matcher` for the heuristic's limits.
//! Addresses are format-checked locally before any explorer request.

pub mod address;
pub mod matcher;
pub mod types;

pub use address::is_valid_ltc_address;
pub use matcher::{
    PaymentMatcher, DEFAULT_REQUIRED_CONFIRMATIONS, DEFAULT_TX_HISTORY_LIMIT,
    FALLBACK_TX_SCAN_LIMIT,
};
pub use types::{PaymentCheckResult, PaymentError};
