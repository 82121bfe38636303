//! Rupee amount helpers shared by the tax engine and the bill assembler

use bigdecimal::{BigDecimal, RoundingMode};

/// Decimal places kept for rupee amounts (paise)
pub const CURRENCY_SCALE: i64 = 2;

/// Round an amount to paise, half-up.
///
/// Every rounding point in the crate goes through here so that inclusive,
/// exclusive and split computations agree on the same mode.
pub fn round_currency(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(CURRENCY_SCALE, RoundingMode::HalfUp)
}

/// Zero rupees
pub fn zero() -> BigDecimal {
    BigDecimal::from(0)
}

/// One paisa (0.01)
pub fn one_paisa() -> BigDecimal {
    BigDecimal::from(1) / BigDecimal::from(100)
}

/// `value` percent as a fraction, e.g. `percent(18)` is 0.18
pub fn percent(value: u32) -> BigDecimal {
    BigDecimal::from(value) / BigDecimal::from(100)
}
