// src/units.rs
use alloy::primitives::U256;
use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::BigDecimal;
use rust_decimal::Decimal;

use crate::error::{DexError, Result};

/// Allowances at or above half of `U256::MAX` count as unlimited.
pub const UNLIMITED_THRESHOLD: U256 =
    U256::from_limbs([u64::MAX, u64::MAX, u64::MAX, u64::MAX >> 1]);

/// Convert base units into display units (`raw / 10^decimals`), exactly.
pub fn to_display(raw: U256, decimals: u8) -> BigDecimal {
    let digits = BigInt::from_bytes_be(Sign::Plus, &raw.to_be_bytes::<32>());
    BigDecimal::new(digits, i64::from(decimals)).normalized()
}

/// Scale a display amount into base units, truncating digits below `10^-decimals`.
pub fn to_base_units(amount: Decimal, decimals: u8) -> Result<U256> {
    if amount < Decimal::ZERO {
        return Err(DexError::InvalidAmount(format!("negative amount {amount}")));
    }
    if amount.is_zero() {
        return Ok(U256::ZERO);
    }

    let mantissa = U256::from(amount.mantissa().unsigned_abs());
    let scale = amount.scale();
    let decimals = u32::from(decimals);

    let value = if decimals >= scale {
        pow10(decimals - scale).and_then(|p| mantissa.checked_mul(p))
    } else {
        pow10(scale - decimals).map(|p| mantissa / p)
    };

    value.ok_or_else(|| {
        DexError::InvalidAmount(format!("{amount} with {decimals} decimals overflows uint256"))
    })
}

pub fn is_unlimited(raw_allowance: U256) -> bool {
    raw_allowance >= UNLIMITED_THRESHOLD
}

/// `floor(amount * (1 - slippage_pct / 100))`.
///
/// Slippage above 100% yields zero. Negative slippage raises the minimum above
/// `amount` and is applied as given.
pub fn apply_slippage(amount: U256, slippage_pct: Decimal) -> Result<U256> {
    let factor = Decimal::ONE - slippage_pct / Decimal::ONE_HUNDRED;
    if factor <= Decimal::ZERO {
        return Ok(U256::ZERO);
    }

    let numerator = U256::from(factor.mantissa().unsigned_abs());
    let denominator = pow10(factor.scale())
        .ok_or_else(|| DexError::InvalidAmount(format!("slippage {slippage_pct} out of range")))?;

    // split so that amount * numerator cannot overflow when factor <= 1
    let whole = (amount / denominator).checked_mul(numerator);
    let rest = (amount % denominator) * numerator / denominator;

    whole
        .and_then(|w| w.checked_add(rest))
        .ok_or_else(|| {
            DexError::InvalidAmount(format!("{amount} with slippage {slippage_pct} overflows uint256"))
        })
}

/// Unix deadline `window_secs` after `now_secs`.
pub fn deadline(now_secs: u64, window_secs: u64) -> U256 {
    U256::from(now_secs.saturating_add(window_secs))
}

fn pow10(exp: u32) -> Option<U256> {
    U256::from(10u8).checked_pow(U256::from(exp))
}
