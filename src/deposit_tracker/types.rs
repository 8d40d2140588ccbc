//! Deposit Tracker Types

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::common::ServiceConfig;
use crate::payment::DEFAULT_REQUIRED_CONFIRMATIONS;

/// Default pause between reconciliation cycles
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Reconciliation loop configuration
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Sleep between cycles, also after a failed cycle
    pub poll_interval: Duration,
    /// Confirmations needed before a deposit is credited
    pub required_confirmations: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            required_confirmations: DEFAULT_REQUIRED_CONFIRMATIONS,
        }
    }
}

impl From<&ServiceConfig> for TrackerConfig {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            poll_interval: config.poll_interval,
            required_confirmations: config.required_confirmations,
        }
    }
}

/// What happened to one deposit during a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DepositOutcome {
    /// Explorer had no status for the transaction
    StatusUnavailable,
    /// Confirmation count stored, deposit still pending
    Updated { confirmations: u32 },
    /// User credited and deposit marked confirmed
    Finalized { confirmations: u32 },
}

/// Summary of a single reconciliation cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub checked: usize,
    pub unavailable: usize,
    pub updated: usize,
    pub finalized: usize,
    pub errors: usize,
    pub cache_flushed: bool,
}

impl CycleReport {
    pub(crate) fn record(&mut self, outcome: DepositOutcome) {
        match outcome {
            DepositOutcome::StatusUnavailable => self.unavailable += 1,
            DepositOutcome::Updated { .. } => self.updated += 1,
            DepositOutcome::Finalized { .. } => self.finalized += 1,
        }
    }
}

/// Tracker statistics, cumulative since start
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerStats {
    pub cycles: u64,
    pub failed_cycles: u64,
    pub deposits_checked: u64,
    pub confirmations_updated: u64,
    pub finalized: u64,
    pub deposit_errors: u64,
}

impl TrackerStats {
    pub(crate) fn absorb(&mut self, report: &CycleReport) {
        self.cycles += 1;
        self.deposits_checked += report.checked as u64;
        self.confirmations_updated += (report.updated + report.finalized) as u64;
        self.finalized += report.finalized as u64;
        self.deposit_errors += report.errors as u64;
    }
}

impl std::fmt::Display for TrackerStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cycles: {} ({} failed) | {} checked | {} updated | {} finalized | {} errors",
            self.cycles,
            self.failed_cycles,
            self.deposits_checked,
            self.confirmations_updated,
            self.finalized,
            self.deposit_errors
        )
    }
}
