//! In-Memory Storage Implementation
//!
//! Provides in-memory storage for testing and development.
//! Data is lost when the service restarts.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::traits::{DepositStore, StorageError, StorageResult};
use super::types::{now_secs, DepositStatus, PendingDeposit};

#[derive(Debug, Default)]
struct MemoryState {
    /// Deposits indexed by txid
    deposits: HashMap<String, PendingDeposit>,
    /// user_id -> USD balance
    balances: HashMap<i64, Decimal>,
}

/// In-memory deposit store
///
/// Deposits and balances share one lock so finalization is atomic.
#[derive(Debug, Clone, Default)]
pub struct MemoryDepositStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryDepositStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored deposits in any status
    pub async fn len(&self) -> usize {
        self.state.read().await.deposits.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DepositStore for MemoryDepositStore {
    async fn create_deposit(&self, deposit: &PendingDeposit) -> StorageResult<()> {
        let mut state = self.state.write().await;

        match state.deposits.get_mut(&deposit.txid) {
            Some(existing) => {
                existing.confirmations = existing.confirmations.max(deposit.confirmations);
                if !existing.is_confirmed() {
                    existing.status = deposit.status;
                }
                existing.updated_at = now_secs();
            }
            None => {
                state.deposits.insert(deposit.txid.clone(), deposit.clone());
            }
        }

        Ok(())
    }

    async fn get_deposit(&self, txid: &str) -> StorageResult<Option<PendingDeposit>> {
        Ok(self.state.read().await.deposits.get(txid).cloned())
    }

    async fn list_pending_deposits(&self) -> StorageResult<Vec<PendingDeposit>> {
        let state = self.state.read().await;
        let mut pending: Vec<PendingDeposit> = state
            .deposits
            .values()
            .filter(|d| d.status == DepositStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.txid.cmp(&b.txid)));
        Ok(pending)
    }

    async fn update_confirmations(&self, txid: &str, confirmations: u32) -> StorageResult<()> {
        let mut state = self.state.write().await;
        let deposit = state
            .deposits
            .get_mut(txid)
            .ok_or_else(|| StorageError::NotFound(txid.to_string()))?;

        if confirmations > deposit.confirmations {
            deposit.confirmations = confirmations;
            deposit.updated_at = now_secs();
        }
        Ok(())
    }

    async fn finalize_deposit(
        &self,
        txid: &str,
        user_id: i64,
        amount_usd: Decimal,
    ) -> StorageResult<bool> {
        let mut state = self.state.write().await;

        let deposit = state
            .deposits
            .get_mut(txid)
            .ok_or_else(|| StorageError::NotFound(txid.to_string()))?;
        if deposit.is_confirmed() {
            return Ok(false);
        }
        deposit.status = DepositStatus::Confirmed;
        deposit.updated_at = now_secs();

        *state.balances.entry(user_id).or_default() += amount_usd;
        Ok(true)
    }

    async fn user_balance(&self, user_id: i64) -> StorageResult<Decimal> {
        Ok(self
            .state
            .read()
            .await
            .balances
            .get(&user_id)
            .copied()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn deposit(txid: &str, created_at: u64) -> PendingDeposit {
        let mut d = PendingDeposit::new(txid, "ltc1qdeposit", 42, dec!(0.5), dec!(40));
        d.created_at = created_at;
        d
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryDepositStore::new();
        store.create_deposit(&deposit("tx1", 1)).await.unwrap();

        let found = store.get_deposit("tx1").await.unwrap().unwrap();
        assert_eq!(found.amount_ltc, dec!(0.5));
        assert!(store.get_deposit("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_is_upsert_on_txid() {
        let store = MemoryDepositStore::new();
        store.create_deposit(&deposit("tx1", 1)).await.unwrap();
        store
            .create_deposit(&deposit("tx1", 1).with_confirmations(2))
            .await
            .unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get_deposit("tx1").await.unwrap().unwrap().confirmations, 2);
    }

    #[tokio::test]
    async fn test_pending_newest_first() {
        let store = MemoryDepositStore::new();
        store.create_deposit(&deposit("old", 100)).await.unwrap();
        store.create_deposit(&deposit("new", 200)).await.unwrap();

        let txids: Vec<String> = store
            .list_pending_deposits()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.txid)
            .collect();
        assert_eq!(txids, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_confirmations_never_decrease() {
        let store = MemoryDepositStore::new();
        store.create_deposit(&deposit("tx1", 1)).await.unwrap();

        store.update_confirmations("tx1", 2).await.unwrap();
        store.update_confirmations("tx1", 1).await.unwrap();

        let d = store.get_deposit("tx1").await.unwrap().unwrap();
        assert_eq!(d.confirmations, 2);
        assert_eq!(d.status, DepositStatus::Pending);
    }

    #[tokio::test]
    async fn test_update_unknown_deposit() {
        let store = MemoryDepositStore::new();
        let result = store.update_confirmations("nope", 1).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_finalize_credits_once() {
        let store = MemoryDepositStore::new();
        store.create_deposit(&deposit("tx1", 1)).await.unwrap();

        assert!(store.finalize_deposit("tx1", 42, dec!(40)).await.unwrap());
        assert!(!store.finalize_deposit("tx1", 42, dec!(40)).await.unwrap());

        assert_eq!(store.user_balance(42).await.unwrap(), dec!(40));
        assert!(store.list_pending_deposits().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_does_not_reopen_confirmed() {
        let store = MemoryDepositStore::new();
        store.create_deposit(&deposit("tx1", 1)).await.unwrap();
        store.finalize_deposit("tx1", 42, dec!(40)).await.unwrap();

        store.create_deposit(&deposit("tx1", 1)).await.unwrap();

        let d = store.get_deposit("tx1").await.unwrap().unwrap();
        assert_eq!(d.status, DepositStatus::Confirmed);
    }
}
