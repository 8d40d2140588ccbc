//! Deposit records
//!
//! A deposit moves `pending -> confirmed` once and never back.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle of a registered deposit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositStatus {
    /// Waiting for enough confirmations
    #[default]
    Pending,
    /// User credited (terminal)
    Confirmed,
}

impl std::fmt::Display for DepositStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
        }
    }
}

impl FromStr for DepositStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            _ => Err(format!("unknown deposit status: {}", s)),
        }
    }
}

/// An incoming payment awaiting (or past) confirmation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingDeposit {
    pub txid: String,
    pub address: String,
    pub user_id: i64,
    pub amount_ltc: Decimal,
    /// Credited to the user on finalization
    pub amount_usd: Decimal,
    pub confirmations: u32,
    pub status: DepositStatus,
    /// Unix seconds
    pub created_at: u64,
    pub updated_at: u64,
}

impl PendingDeposit {
    pub fn new(
        txid: impl Into<String>,
        address: impl Into<String>,
        user_id: i64,
        amount_ltc: Decimal,
        amount_usd: Decimal,
    ) -> Self {
        let now = now_secs();
        Self {
            txid: txid.into(),
            address: address.into(),
            user_id,
            amount_ltc,
            amount_usd,
            confirmations: 0,
            status: DepositStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_confirmations(mut self, confirmations: u32) -> Self {
        self.confirmations = confirmations;
        self
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == DepositStatus::Confirmed
    }
}

pub(crate) fn now_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}
