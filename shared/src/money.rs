//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts are stored and serialized as `f64`; every calculation converts to
//! `Decimal`, computes, then rounds back to 2 decimal places.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed price or payment amount
pub const MAX_AMOUNT: f64 = 1_000_000.0;

/// Convert f64 to Decimal for calculation
///
/// Input values should be validated with [`is_valid_amount`] at the boundary.
/// Non-finite values are logged and treated as zero.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Round a Decimal to 2 decimal places
#[inline]
pub fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round(value).to_f64().unwrap_or_default()
}

/// Finite, non-negative and within [`MAX_AMOUNT`]
pub fn is_valid_amount(value: f64) -> bool {
    value.is_finite() && (0.0..=MAX_AMOUNT).contains(&value)
}

/// Whether two amounts are equal within [`MONEY_TOLERANCE`]
pub fn approx_eq(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() < MONEY_TOLERANCE
}
