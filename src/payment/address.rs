//! Local Litecoin address format checks
//!
//! Run before any explorer request so malformed input never reaches a URL.
//! Bech32 addresses are checked for prefix, charset and length; base58
//! addresses are decoded and their double-SHA256 checksum verified.

use sha2::{Digest, Sha256};

/// Bech32 human-readable prefixes (mainnet, testnet)
const BECH32_PREFIXES: [&str; 2] = ["ltc1", "tltc1"];

/// Bech32 length bounds for the `ltc1` prefix; testnet adds one character
const BECH32_MIN_LEN: usize = 40;
const BECH32_MAX_LEN: usize = 62;

/// Leading characters of base58 addresses: P2PKH `L`, P2SH `M` and legacy `3`
/// on mainnet; `m`/`n`, `Q` and `2` on testnet
const BASE58_PREFIXES: [char; 7] = ['L', 'M', '3', 'm', 'n', 'Q', '2'];

/// Version byte + 20-byte hash + 4-byte checksum
const BASE58_DECODED_LEN: usize = 25;

/// True iff `address` is a well-formed Litecoin address
pub fn is_valid_ltc_address(address: &str) -> bool {
    if let Some(prefix) = BECH32_PREFIXES.iter().find(|p| address.starts_with(*p)) {
        return is_valid_bech32(address, prefix.len() - BECH32_PREFIXES[0].len());
    }

    match address.chars().next() {
        Some(first) if BASE58_PREFIXES.contains(&first) => is_valid_base58check(address),
        _ => false,
    }
}

fn is_valid_bech32(address: &str, extra_prefix_len: usize) -> bool {
    let len = address.len();
    (BECH32_MIN_LEN + extra_prefix_len..=BECH32_MAX_LEN + extra_prefix_len).contains(&len)
        && address.bytes().all(|b| b.is_ascii_alphanumeric())
}

fn is_valid_base58check(address: &str) -> bool {
    let decoded = match bs58::decode(address).into_vec() {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    if decoded.len() != BASE58_DECODED_LEN {
        return false;
    }

    let (payload, checksum) = decoded.split_at(BASE58_DECODED_LEN - 4);
    let digest = Sha256::digest(Sha256::digest(payload));
    &digest[..4] == checksum
}
