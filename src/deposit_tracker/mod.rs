//! Deposit Tracker Module
//!
//! Reconciles registered deposits against the chain:
//!
//! ```text
//! PENDING → CONFIRMED
//! ```
//!
//! ## Components
//!
//! - **types**: Configuration, per-deposit outcomes and statistics
//! - **service**: `DepositMonitor`, the polling reconciliation loop

pub mod service;
pub mod types;

pub use service::{DepositMonitor, TrackerError};
pub use types::{
    CycleReport, DepositOutcome, TrackerConfig, TrackerStats, DEFAULT_POLL_INTERVAL,
};
