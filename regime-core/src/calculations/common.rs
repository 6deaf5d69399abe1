//! Common utility functions for tax calculations.
//!
//! Rounding conventions and the numeric validation every calculator runs at
//! its boundary before doing any arithmetic.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::TaxEngineError;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Used for percentages. Values at exactly 0.005 round away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use regime_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(33.334)), dec!(33.33));
/// assert_eq!(round_half_up(dec!(33.335)), dec!(33.34));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a monetary amount to the nearest whole currency unit, half away
/// from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use regime_core::calculations::common::round_to_currency_unit;
///
/// assert_eq!(round_to_currency_unit(dec!(12499.49)), dec!(12499));
/// assert_eq!(round_to_currency_unit(dec!(12499.50)), dec!(12500));
/// ```
pub fn round_to_currency_unit(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns `value` if it is non-negative, otherwise an
/// [`TaxEngineError::InvalidInput`] naming `field`.
pub fn ensure_non_negative(
    field: &'static str,
    value: Decimal,
) -> Result<Decimal, TaxEngineError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(TaxEngineError::invalid_input(field, value));
    }
    Ok(value)
}

/// Converts a float from an upstream layer into a validated amount.
///
/// NaN, infinities, values outside the decimal range and negative values are
/// all rejected; nothing is coerced to zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use regime_core::calculations::common::amount_from_f64;
///
/// assert_eq!(amount_from_f64("salary", 1250.5).unwrap(), dec!(1250.5));
/// assert!(amount_from_f64("salary", f64::NAN).is_err());
/// ```
pub fn amount_from_f64(
    field: &'static str,
    value: f64,
) -> Result<Decimal, TaxEngineError> {
    if !value.is_finite() {
        return Err(TaxEngineError::invalid_input(field, value));
    }
    let amount =
        Decimal::from_f64(value).ok_or_else(|| TaxEngineError::invalid_input(field, value))?;
    ensure_non_negative(field, amount)
}
