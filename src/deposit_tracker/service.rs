//! Deposit Reconciliation Service
//!
//! Re-checks every pending deposit against the explorer and advances it:
//! pending → confirmed (terminal)
//!
//! # Cycle:
//! 1. Flush the explorer cache if its interval has elapsed
//! 2. Load pending deposits from the store
//! 3. For each: fetch tx status, persist confirmations, finalize once the
//!    threshold is reached
//! 4. Sleep `poll_interval`, repeat
//!
//! A failure on one deposit is logged and the cycle moves on to the next.
//! Failing to load the pending list fails the whole cycle.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::types::{CycleReport, DepositOutcome, TrackerConfig, TrackerStats};
use crate::common::{log_transaction_event, LogLevel};
use crate::explorer::ExplorerClient;
use crate::storage::{DepositStore, PendingDeposit, StorageError};

/// Reconciliation errors
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl TrackerError {
    /// Errors worth retrying on the next cycle
    pub fn is_transient(&self) -> bool {
        matches!(self, TrackerError::Storage(StorageError::Connection(_)))
    }
}

/// Background worker that reconciles pending deposits
pub struct DepositMonitor {
    explorer: Arc<ExplorerClient>,
    store: Arc<dyn DepositStore>,
    config: TrackerConfig,
    stats: Arc<RwLock<TrackerStats>>,
}

impl DepositMonitor {
    pub fn new(
        explorer: Arc<ExplorerClient>,
        store: Arc<dyn DepositStore>,
        config: TrackerConfig,
    ) -> Self {
        Self {
            explorer,
            store,
            config,
            stats: Arc::new(RwLock::new(TrackerStats::default())),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Shared handle to the running statistics
    pub fn stats_handle(&self) -> Arc<RwLock<TrackerStats>> {
        self.stats.clone()
    }

    /// Snapshot of the statistics
    pub async fn stats(&self) -> TrackerStats {
        self.stats.read().await.clone()
    }

    /// Run forever
    ///
    /// Cycle errors are logged; the loop always sleeps before the next cycle.
    pub async fn run(&self) {
        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            required_confirmations = self.config.required_confirmations,
            explorer = %self.explorer.base_url(),
            "Deposit monitor started"
        );

        loop {
            match self.process_cycle().await {
                Ok(report) if report.checked > 0 => {
                    info!(
                        checked = report.checked,
                        updated = report.updated,
                        finalized = report.finalized,
                        errors = report.errors,
                        "Reconciliation cycle complete"
                    );
                }
                Ok(_) => debug!("No pending deposits"),
                Err(e) => error!("Error in deposit monitoring: {}", e),
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Run a single reconciliation cycle
    pub async fn process_cycle(&self) -> Result<CycleReport, TrackerError> {
        let mut report = CycleReport {
            cache_flushed: self.explorer.flush_cache_if_due().await,
            ..CycleReport::default()
        };

        let pending = match self.store.list_pending_deposits().await {
            Ok(pending) => pending,
            Err(e) => {
                self.stats.write().await.failed_cycles += 1;
                return Err(e.into());
            }
        };

        for deposit in &pending {
            report.checked += 1;
            match self.reconcile_deposit(deposit).await {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    report.errors += 1;
                    error!(txid = %deposit.txid, "Error reconciling deposit: {}", e);
                }
            }
        }

        self.stats.write().await.absorb(&report);
        Ok(report)
    }

    /// Reconcile one deposit against its current transaction status
    pub async fn reconcile_deposit(
        &self,
        deposit: &PendingDeposit,
    ) -> Result<DepositOutcome, TrackerError> {
        let status = match self.explorer.get_transaction_status(&deposit.txid).await {
            Some(status) => status,
            None => {
                warn!(txid = %deposit.txid, "Transaction status unavailable");
                return Ok(DepositOutcome::StatusUnavailable);
            }
        };

        let confirmations = status.confirmations();
        self.store
            .update_confirmations(&deposit.txid, confirmations)
            .await?;

        if confirmations < self.config.required_confirmations || deposit.is_confirmed() {
            return Ok(DepositOutcome::Updated { confirmations });
        }

        let credited = self
            .store
            .finalize_deposit(&deposit.txid, deposit.user_id, deposit.amount_usd)
            .await?;
        if !credited {
            debug!(txid = %deposit.txid, "Deposit already finalized");
            return Ok(DepositOutcome::Updated { confirmations });
        }

        log_transaction_event(
            &format!("deposit_{}", deposit.txid),
            &deposit.address,
            deposit.amount_ltc,
            "CONFIRMED",
            &format!("Deposit confirmed with {} confirmations", confirmations),
            LogLevel::Info,
        );

        Ok(DepositOutcome::Finalized { confirmations })
    }
}
