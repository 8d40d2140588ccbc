//! Payment Matcher
//!
//! Decides whether an address has received an expected amount using a
//! two-phase heuristic:
//!
//! 1. **Exact UTXO**: the first unspent output (in API order) whose value equals
//!    the expected amount in litoshi is the payment.
//! 2. **Balance fallback**: when no single output matches but the address
//!    balance covers the expected amount, the most recent transaction output
//!    (among the last 10 transactions) paying at least that much is taken.
//!
//! The fallback handles overpayment and merged outputs, but it is a heuristic:
//! it can attribute an unrelated, sufficiently large payment to this check and
//! report that payment's confirmation state. Tightening it is a product
//! decision, so the behavior is kept as is.
//!
//! Callers never see errors from `check_payment`; failures collapse into
//! `PaymentCheckResult::not_found()`. Use `try_check_payment` to observe them.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::address::is_valid_ltc_address;
use super::types::{PaymentCheckResult, PaymentError};
use crate::explorer::{ExplorerClient, Transaction};
use crate::units::{format_litoshi, litoshi_to_ltc, ltc_to_litoshi};

/// Confirmations before a payment counts as confirmed
pub const DEFAULT_REQUIRED_CONFIRMATIONS: u32 = 3;

/// How many recent transactions the balance fallback inspects
pub const FALLBACK_TX_SCAN_LIMIT: usize = 10;

/// Default history page size for `get_address_transactions`
pub const DEFAULT_TX_HISTORY_LIMIT: usize = 50;

/// Answers "has address X received amount Y yet?"
#[derive(Debug, Clone)]
pub struct PaymentMatcher {
    explorer: Arc<ExplorerClient>,
    required_confirmations: u32,
}

impl PaymentMatcher {
    pub fn new(explorer: Arc<ExplorerClient>) -> Self {
        Self {
            explorer,
            required_confirmations: DEFAULT_REQUIRED_CONFIRMATIONS,
        }
    }

    pub fn with_required_confirmations(mut self, confirmations: u32) -> Self {
        self.required_confirmations = confirmations;
        self
    }

    pub fn required_confirmations(&self) -> u32 {
        self.required_confirmations
    }

    /// Check for a payment of `expected_ltc` to `address`, never failing
    pub async fn check_payment(&self, address: &str, expected_ltc: Decimal) -> PaymentCheckResult {
        match self.try_check_payment(address, expected_ltc).await {
            Ok(result) => result,
            Err(e) => {
                error!("Error checking payment for address {}: {}", address, e);
                PaymentCheckResult::not_found()
            }
        }
    }

    /// Check for a payment, surfacing invalid input as an error
    pub async fn try_check_payment(
        &self,
        address: &str,
        expected_ltc: Decimal,
    ) -> Result<PaymentCheckResult, PaymentError> {
        if !is_valid_ltc_address(address) {
            return Err(PaymentError::InvalidAddress(address.to_string()));
        }
        let expected_litoshi =
            ltc_to_litoshi(expected_ltc).ok_or(PaymentError::InvalidAmount(expected_ltc))?;

        let utxos = match self.explorer.get_address_utxo(address).await {
            Some(utxos) if !utxos.is_empty() => utxos,
            _ => return Ok(PaymentCheckResult::not_found()),
        };

        // Phase 1: exact value match
        if let Some(utxo) = utxos
            .iter()
            .find(|u| u.value == expected_litoshi && !u.txid.is_empty())
        {
            let confirmations = self.confirmations_of(&utxo.txid).await;
            debug!(
                address,
                txid = %utxo.txid,
                confirmations,
                "Exact UTXO match"
            );
            return Ok(PaymentCheckResult::matched(
                utxo.txid.clone(),
                expected_ltc,
                confirmations,
                self.required_confirmations,
            ));
        }

        // Phase 2: balance fallback
        let info = match self.explorer.get_address_info(address).await {
            Some(info) => info,
            None => return Ok(PaymentCheckResult::not_found()),
        };

        if info.balance_litoshi() < expected_litoshi {
            return Ok(PaymentCheckResult::not_found());
        }

        let txs = self
            .explorer
            .get_address_transactions(address, FALLBACK_TX_SCAN_LIMIT)
            .await
            .unwrap_or_default();

        if let Some((txid, value)) = find_covering_output(&txs, address, expected_litoshi) {
            let confirmations = self.confirmations_of(&txid).await;
            debug!(
                address,
                txid = %txid,
                value = %format_litoshi(value),
                confirmations,
                "Balance fallback match"
            );
            return Ok(PaymentCheckResult::matched(
                txid,
                litoshi_to_ltc(value),
                confirmations,
                self.required_confirmations,
            ));
        }

        Ok(PaymentCheckResult::not_found())
    }

    /// True iff the address is well-formed and the explorer resolves it
    pub async fn validate_address(&self, address: &str) -> bool {
        is_valid_ltc_address(address) && self.explorer.get_address_info(address).await.is_some()
    }

    /// Balance in LTC including mempool activity; zero when unavailable
    pub async fn get_balance(&self, address: &str) -> Decimal {
        if !is_valid_ltc_address(address) {
            return Decimal::ZERO;
        }
        self.explorer
            .get_address_info(address)
            .await
            .map(|info| litoshi_to_ltc(info.balance_litoshi()))
            .unwrap_or(Decimal::ZERO)
    }

    pub async fn get_address_transactions(
        &self,
        address: &str,
        limit: usize,
    ) -> Option<Vec<Transaction>> {
        if !is_valid_ltc_address(address) {
            warn!(address, "Rejected malformed address");
            return None;
        }
        self.explorer.get_address_transactions(address, limit).await
    }

    async fn confirmations_of(&self, txid: &str) -> u32 {
        self.explorer
            .get_transaction_status(txid)
            .await
            .map(|status| status.confirmations())
            .unwrap_or(0)
    }
}

/// First output to `address` worth at least `min_litoshi`, scanning
/// transactions in API order. Transactions without inputs or outputs are
/// skipped.
fn find_covering_output(
    txs: &[Transaction],
    address: &str,
    min_litoshi: u64,
) -> Option<(String, u64)> {
    txs.iter()
        .filter(|tx| !tx.vin.is_empty() && !tx.vout.is_empty())
        .find_map(|tx| {
            tx.outputs_to(address)
                .find(|out| out.value >= min_litoshi)
                .map(|out| (tx.txid.clone(), out.value))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::transport::{HttpResponse, MockHttpTransport};
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const BASE: &str = "http://explorer.test/api";
    const ADDR: &str = "ltc1qpayee7x3m5w0fn2h8sdkz4c6vq9ya0tlgrje5u";
    const UNKNOWN: &str = "ltc1qunknown4d8sk2xr7p0mz3vq6wfy9ce5htl0ga";

    /// Mock explorer answering from a path -> JSON table; unknown paths are 404.
    /// `{addr}` in a path stands for `ADDR`.
    fn explorer(routes: Vec<(&str, Value)>) -> (Arc<ExplorerClient>, Arc<AtomicUsize>) {
        let table: HashMap<String, Value> = routes
            .into_iter()
            .map(|(path, body)| (format!("{}{}", BASE, path.replace("{addr}", ADDR)), body))
            .collect();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut mock = MockHttpTransport::new();
        mock.expect_get().returning(move |url, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(match table.get(url) {
                Some(body) => HttpResponse::ok_json(body),
                None => HttpResponse::new(404, "not found"),
            })
        });

        (
            Arc::new(ExplorerClient::with_transport(BASE, Arc::new(mock))),
            calls,
        )
    }

    fn tx(txid: &str, outputs: Value) -> Value {
        json!({"txid": txid, "vin": [{"txid": "prev", "vout": 0}], "vout": outputs})
    }

    #[tokio::test]
    async fn test_exact_utxo_match_confirmed() {
        let (client, _) = explorer(vec![
            (
                "/address/{addr}/utxo",
                json!([{"txid": "tx_exact", "vout": 0, "value": 150_000_000u64}]),
            ),
            ("/tx/tx_exact/status", json!({"confirmed": true, "confirmations": 5})),
        ]);
        let matcher = PaymentMatcher::new(client);

        let result = matcher.check_payment(ADDR, dec!(1.5)).await;

        assert_eq!(
            result,
            PaymentCheckResult {
                found: true,
                confirmed: true,
                confirmations: 5,
                amount: dec!(1.5),
                txid: Some("tx_exact".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_exact_match_first_in_api_order() {
        let (client, _) = explorer(vec![
            (
                "/address/{addr}/utxo",
                json!([
                    {"txid": "other", "value": 1u64},
                    {"txid": "first", "value": 50_000_000u64},
                    {"txid": "second", "value": 50_000_000u64}
                ]),
            ),
            ("/tx/first/status", json!({"confirmed": false, "confirmations": 0})),
        ]);
        let matcher = PaymentMatcher::new(client);

        let result = matcher.check_payment(ADDR, dec!(0.5)).await;

        assert!(result.found);
        assert!(!result.confirmed);
        assert_eq!(result.txid.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_exact_match_without_status_is_unconfirmed() {
        let (client, _) = explorer(vec![(
            "/address/{addr}/utxo",
            json!([{"txid": "tx_exact", "value": 100_000_000u64}]),
        )]);
        let matcher = PaymentMatcher::new(client);

        let result = matcher.check_payment(ADDR, dec!(1)).await;

        assert!(result.found);
        assert!(!result.confirmed);
        assert_eq!(result.confirmations, 0);
        assert_eq!(result.txid.as_deref(), Some("tx_exact"));
    }

    #[tokio::test]
    async fn test_utxo_without_txid_is_skipped() {
        let (client, _) = explorer(vec![
            (
                "/address/{addr}/utxo",
                json!([
                    {"vout": 0, "value": 150_000_000u64},
                    {"txid": "paytx", "vout": 1, "value": 150_000_000u64}
                ]),
            ),
            ("/tx/paytx/status", json!({"confirmed": true, "confirmations": 4})),
        ]);
        let matcher = PaymentMatcher::new(client);

        let result = matcher.check_payment(ADDR, dec!(1.5)).await;

        assert!(result.found);
        assert!(result.confirmed);
        assert_eq!(result.txid.as_deref(), Some("paytx"));
    }

    #[tokio::test]
    async fn test_no_utxos_is_not_found() {
        let (client, calls) = explorer(vec![("/address/{addr}/utxo", json!([]))]);
        let matcher = PaymentMatcher::new(client);

        let result = matcher.check_payment(ADDR, dec!(1)).await;

        assert_eq!(result, PaymentCheckResult::not_found());
        // no fallback lookups
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_balance_fallback_reports_observed_amount() {
        let (client, _) = explorer(vec![
            (
                "/address/{addr}/utxo",
                json!([{"txid": "merged", "value": 250_000_000u64}]),
            ),
            (
                "/address/{addr}",
                json!({
                    "chain_stats": {"funded_txo_sum": 250_000_000u64, "spent_txo_sum": 0},
                    "mempool_stats": {"funded_txo_sum": 0, "spent_txo_sum": 0}
                }),
            ),
            (
                "/address/{addr}/txs?limit=10",
                json!([
                    tx("small", json!([{"scriptpubkey_address": ADDR, "value": 10_000_000u64}])),
                    tx("big", json!([
                        {"scriptpubkey_address": "ltc1qchange", "value": 900_000_000u64},
                        {"scriptpubkey_address": ADDR, "value": 200_000_000u64}
                    ]))
                ]),
            ),
            ("/tx/big/status", json!({"confirmed": true, "confirmations": 2})),
        ]);
        let matcher = PaymentMatcher::new(client);

        let result = matcher.check_payment(ADDR, dec!(1.5)).await;

        assert!(result.found);
        assert!(!result.confirmed);
        assert_eq!(result.confirmations, 2);
        assert_eq!(result.amount, dec!(2));
        assert_eq!(result.txid.as_deref(), Some("big"));
    }

    #[tokio::test]
    async fn test_balance_below_expected_is_not_found() {
        let (client, _) = explorer(vec![
            (
                "/address/{addr}/utxo",
                json!([{"txid": "t", "value": 100_000_000u64}]),
            ),
            (
                "/address/{addr}",
                json!({
                    "chain_stats": {"funded_txo_sum": 300_000_000u64, "spent_txo_sum": 200_000_000u64},
                    "mempool_stats": {"funded_txo_sum": 0, "spent_txo_sum": 0}
                }),
            ),
        ]);
        let matcher = PaymentMatcher::new(client);

        let result = matcher.check_payment(ADDR, dec!(1.5)).await;
        assert_eq!(result, PaymentCheckResult::not_found());
    }

    #[tokio::test]
    async fn test_fallback_skips_transactions_without_inputs() {
        let (client, _) = explorer(vec![
            (
                "/address/{addr}/utxo",
                json!([{"txid": "t", "value": 300_000_000u64}]),
            ),
            (
                "/address/{addr}",
                json!({"chain_stats": {"funded_txo_sum": 300_000_000u64, "spent_txo_sum": 0}}),
            ),
            (
                "/address/{addr}/txs?limit=10",
                json!([
                    {"txid": "no_inputs", "vin": [], "vout": [{"scriptpubkey_address": ADDR, "value": 300_000_000u64}]}
                ]),
            ),
        ]);
        let matcher = PaymentMatcher::new(client);

        assert_eq!(
            matcher.check_payment(ADDR, dec!(1)).await,
            PaymentCheckResult::not_found()
        );
    }

    #[tokio::test]
    async fn test_negative_amount_collapses_to_not_found() {
        let (client, calls) = explorer(vec![]);
        let matcher = PaymentMatcher::new(client);

        assert!(matches!(
            matcher.try_check_payment(ADDR, dec!(-1)).await,
            Err(PaymentError::InvalidAmount(_))
        ));
        assert_eq!(
            matcher.check_payment(ADDR, dec!(-1)).await,
            PaymentCheckResult::not_found()
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_required_confirmations_is_configurable() {
        let (client, _) = explorer(vec![
            (
                "/address/{addr}/utxo",
                json!([{"txid": "t", "value": 100_000_000u64}]),
            ),
            ("/tx/t/status", json!({"confirmed": true, "confirmations": 5})),
        ]);
        let matcher = PaymentMatcher::new(client).with_required_confirmations(6);

        let result = matcher.check_payment(ADDR, dec!(1)).await;
        assert!(result.found);
        assert!(!result.confirmed);
    }

    #[tokio::test]
    async fn test_validate_address_and_balance() {
        let (client, _) = explorer(vec![(
            "/address/{addr}",
            json!({
                "chain_stats": {"funded_txo_sum": 200_000_000u64, "spent_txo_sum": 50_000_000u64},
                "mempool_stats": {"funded_txo_sum": 25_000_000u64, "spent_txo_sum": 0}
            }),
        )]);
        let matcher = PaymentMatcher::new(client);

        assert!(matcher.validate_address(ADDR).await);
        assert!(!matcher.validate_address(UNKNOWN).await);
        assert_eq!(matcher.get_balance(ADDR).await, dec!(1.75));
        assert_eq!(matcher.get_balance(UNKNOWN).await, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_malformed_address_never_reaches_explorer() {
        let (client, calls) = explorer(vec![]);
        let matcher = PaymentMatcher::new(client);

        assert!(!matcher.validate_address("ltc1qx/utxo").await);
        assert!(!matcher.validate_address("garbage?x=1").await);
        assert_eq!(matcher.get_balance("ltc1qx/utxo").await, Decimal::ZERO);
        assert!(matcher
            .get_address_transactions("garbage?x=1", 5)
            .await
            .is_none());
        assert!(matches!(
            matcher.try_check_payment("ltc1qx/utxo", dec!(1)).await,
            Err(PaymentError::InvalidAddress(_))
        ));
        assert_eq!(
            matcher.check_payment("garbage?x=1", dec!(1)).await,
            PaymentCheckResult::not_found()
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_find_covering_output_order() {
        let txs: Vec<Transaction> = serde_json::from_value(json!([
            tx("a", json!([{"scriptpubkey_address": ADDR, "value": 5u64}])),
            tx("b", json!([{"scriptpubkey_address": ADDR, "value": 20u64}])),
            tx("c", json!([{"scriptpubkey_address": ADDR, "value": 30u64}]))
        ]))
        .unwrap();

        assert_eq!(
            find_covering_output(&txs, ADDR, 10),
            Some(("b".to_string(), 20))
        );
        assert_eq!(find_covering_output(&txs, ADDR, 31), None);
    }
}
