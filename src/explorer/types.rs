//! LitecoinSpace (Esplora-compatible) API response types

use serde::{Deserialize, Serialize};

/// `GET /address/{addr}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInfo {
    #[serde(default)]
    pub address: Option<String>,
    pub chain_stats: AddressStats,
    #[serde(default)]
    pub mempool_stats: AddressStats,
}

impl AddressInfo {
    /// Total funded (confirmed + mempool) in litoshi
    pub fn funded_litoshi(&self) -> u64 {
        self.chain_stats
            .funded_txo_sum
            .saturating_add(self.mempool_stats.funded_txo_sum)
    }

    /// Total spent (confirmed + mempool) in litoshi
    pub fn spent_litoshi(&self) -> u64 {
        self.chain_stats
            .spent_txo_sum
            .saturating_add(self.mempool_stats.spent_txo_sum)
    }

    /// Balance including unconfirmed activity
    pub fn balance_litoshi(&self) -> u64 {
        self.funded_litoshi().saturating_sub(self.spent_litoshi())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressStats {
    pub funded_txo_count: u32,
    pub funded_txo_sum: u64,
    pub spent_txo_count: u32,
    pub spent_txo_sum: u64,
    pub tx_count: u32,
}

/// `GET /address/{addr}/utxo` element
///
/// A missing `txid` decodes as empty so one bad entry does not sink the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    #[serde(default)]
    pub txid: String,
    #[serde(default)]
    pub vout: u32,
    pub value: u64,
    #[serde(default)]
    pub status: Option<TxStatus>,
}

/// `GET /tx/{txid}/status`
///
/// Esplora servers report `confirmed`/`block_height`; some deployments also
/// include a precomputed `confirmations` count. The client fills
/// `confirmations` in before caching, so a cached status always carries one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxStatus {
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default)]
    pub block_height: Option<u64>,
    #[serde(default)]
    pub block_hash: Option<String>,
    #[serde(default)]
    pub block_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u32>,
}

impl TxStatus {
    pub fn confirmations(&self) -> u32 {
        self.confirmations.unwrap_or(0)
    }
}

/// `GET /tx/{txid}` and `GET /address/{addr}/txs` element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub txid: String,
    #[serde(default)]
    pub vin: Vec<TxInput>,
    #[serde(default)]
    pub vout: Vec<TxOutput>,
    #[serde(default)]
    pub fee: Option<u64>,
    #[serde(default)]
    pub status: Option<TxStatus>,
}

impl Transaction {
    /// Outputs paying `address`
    pub fn outputs_to<'a>(&'a self, address: &'a str) -> impl Iterator<Item = &'a TxOutput> + 'a {
        self.vout
            .iter()
            .filter(move |out| out.scriptpubkey_address.as_deref() == Some(address))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    #[serde(default)]
    pub txid: Option<String>,
    #[serde(default)]
    pub vout: Option<u32>,
    #[serde(default)]
    pub prevout: Option<TxOutput>,
    #[serde(default)]
    pub is_coinbase: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    #[serde(default)]
    pub scriptpubkey: Option<String>,
    #[serde(default)]
    pub scriptpubkey_type: Option<String>,
    #[serde(default)]
    pub scriptpubkey_address: Option<String>,
    pub value: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_address_balance_includes_mempool() {
        let info: AddressInfo = serde_json::from_value(json!({
            "address": "ltc1qexample",
            "chain_stats": {"funded_txo_sum": 300_000_000u64, "spent_txo_sum": 100_000_000u64, "tx_count": 3},
            "mempool_stats": {"funded_txo_sum": 50_000_000u64, "spent_txo_sum": 0}
        }))
        .unwrap();

        assert_eq!(info.funded_litoshi(), 350_000_000);
        assert_eq!(info.spent_litoshi(), 100_000_000);
        assert_eq!(info.balance_litoshi(), 250_000_000);
    }

    #[test]
    fn test_missing_mempool_stats_default_to_zero() {
        let info: AddressInfo = serde_json::from_value(json!({
            "chain_stats": {"funded_txo_sum": 10, "spent_txo_sum": 4}
        }))
        .unwrap();
        assert_eq!(info.balance_litoshi(), 6);
    }

    #[test]
    fn test_status_without_confirmations_field() {
        let status: TxStatus = serde_json::from_value(json!({
            "confirmed": true,
            "block_height": 2_500_000u64,
            "block_hash": "00ab",
            "block_time": 1_700_000_000u64
        }))
        .unwrap();
        assert!(status.confirmed);
        assert_eq!(status.confirmations, None);
        assert_eq!(status.confirmations(), 0);
    }

    #[test]
    fn test_utxo_list_tolerates_missing_txid() {
        let utxos: Vec<Utxo> = serde_json::from_value(json!([
            {"vout": 0, "value": 150_000_000u64},
            {"txid": "paytx", "vout": 1, "value": 150_000_000u64}
        ]))
        .unwrap();

        assert_eq!(utxos.len(), 2);
        assert!(utxos[0].txid.is_empty());
        assert_eq!(utxos[1].txid, "paytx");
    }

    #[test]
    fn test_outputs_to_address() {
        let tx: Transaction = serde_json::from_value(json!({
            "txid": "aa",
            "vin": [{"txid": "bb", "vout": 0}],
            "vout": [
                {"scriptpubkey_address": "ltc1qother", "value": 5},
                {"scriptpubkey_address": "ltc1qmine", "value": 7},
                {"scriptpubkey_type": "op_return", "value": 0}
            ]
        }))
        .unwrap();

        let values: Vec<u64> = tx.outputs_to("ltc1qmine").map(|o| o.value).collect();
        assert_eq!(values, vec![7]);
    }
}
