//! Payment check types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of checking an address for an expected payment
///
/// `confirmed` implies `found`; a positive confirmation count always comes
/// with a `txid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCheckResult {
    /// A candidate transaction output was located
    pub found: bool,
    /// Found and confirmations reached the threshold
    pub confirmed: bool,
    pub confirmations: u32,
    /// Observed amount in LTC (may exceed the requested one on the balance path)
    pub amount: Decimal,
    pub txid: Option<String>,
}

impl PaymentCheckResult {
    /// Terminal "nothing found" result
    pub fn not_found() -> Self {
        Self {
            found: false,
            confirmed: false,
            confirmations: 0,
            amount: Decimal::ZERO,
            txid: None,
        }
    }

    pub(crate) fn matched(
        txid: String,
        amount: Decimal,
        confirmations: u32,
        required_confirmations: u32,
    ) -> Self {
        Self {
            found: true,
            confirmed: confirmations >= required_confirmations,
            confirmations,
            amount,
            txid: Some(txid),
        }
    }

    /// Payment located and sufficiently confirmed
    pub fn is_paid(&self) -> bool {
        self.found && self.confirmed
    }
}

impl Default for PaymentCheckResult {
    fn default() -> Self {
        Self::not_found()
    }
}

/// Payment matcher errors
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("invalid Litecoin address: {0}")]
    InvalidAddress(String),

    #[error("invalid expected amount: {0}")]
    InvalidAmount(Decimal),
}
