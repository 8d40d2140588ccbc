//! Unit Conversion Utilities
//!
//! Litecoin amounts are compared in litoshi (10^-8 LTC) and reported in
//! whole-coin `Decimal`s.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Litoshi per Litecoin
pub const LITOSHI_PER_LTC: u64 = 100_000_000;

/// Decimal places of one litoshi
const LTC_SCALE: u32 = 8;

/// Convert LTC to litoshi, truncating sub-litoshi digits
///
/// Returns `None` for negative amounts or amounts that overflow `u64`.
pub fn ltc_to_litoshi(ltc: Decimal) -> Option<u64> {
    if ltc.is_sign_negative() && !ltc.is_zero() {
        return None;
    }
    ltc.checked_mul(Decimal::from(LITOSHI_PER_LTC))?
        .trunc()
        .to_u64()
}

/// Convert litoshi to LTC
pub fn litoshi_to_ltc(litoshi: u64) -> Decimal {
    Decimal::from_i128_with_scale(litoshi as i128, LTC_SCALE)
}

/// e.g. 150000000 -> "150000000 litoshi (1.50000000 LTC)"
pub fn format_litoshi(litoshi: u64) -> String {
    format!("{} litoshi ({} LTC)", litoshi, litoshi_to_ltc(litoshi))
}
