//! Exact conversion between decimal token amounts and integer base units.
//!
//! Amounts are parsed with `rust_decimal`, so "10.50" scales to exactly
//! 10500000 at 6 decimals. Digits beyond the token precision are truncated
//! toward zero: a payment is never rounded up past what the user typed.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while converting token amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
	#[error("Amount is not a decimal number: '{0}'")]
	NotANumber(String),
	#[error("Amount must be greater than zero")]
	NotPositive,
	#[error("Amount does not fit in {decimals} decimal places")]
	Overflow { decimals: u32 },
	#[error("Amount is smaller than one base unit")]
	BelowBaseUnit,
}

/// Parses a user supplied amount and requires it to be strictly positive.
pub(crate) fn parse_decimal_amount(amount: &str) -> Result<Decimal, AmountError> {
	let trimmed = amount.trim();
	let value =
		Decimal::from_str(trimmed).map_err(|_| AmountError::NotANumber(trimmed.to_string()))?;

	if value <= Decimal::ZERO {
		return Err(AmountError::NotPositive);
	}

	Ok(value)
}

/// Converts a decimal amount into an integer base-unit string.
///
/// # Arguments
///
/// * `amount` - Whole-token amount such as "1.50"
/// * `decimals` - Fractional digits of the token (6 for USDC)
///
/// # Errors
///
/// Fails when the amount is not a positive number, when scaling overflows,
/// or when truncation leaves nothing to pay.
pub fn to_base_units(amount: &str, decimals: u32) -> Result<String, AmountError> {
	let value = parse_decimal_amount(amount)?;

	let factor = 10i128
		.checked_pow(decimals)
		.and_then(|f| Decimal::try_from_i128_with_scale(f, 0).ok())
		.ok_or(AmountError::Overflow { decimals })?;

	let scaled = value
		.checked_mul(factor)
		.ok_or(AmountError::Overflow { decimals })?
		.round_dp_with_strategy(0, RoundingStrategy::ToZero);

	if scaled.is_zero() {
		return Err(AmountError::BelowBaseUnit);
	}

	Ok(scaled.normalize().to_string())
}

/// Formats a raw base-unit amount for display, e.g. "1500000" at 6 decimals
/// becomes "1.5". Returns `None` if `amount` is not an integer string.
pub fn format_token_amount(amount: &str, decimals: u32) -> Option<String> {
	let mut value = Decimal::from_str(amount.trim()).ok()?;
	if value.scale() != 0 {
		return None;
	}
	value.set_scale(decimals).ok()?;
	Some(value.normalize().to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_to_base_units_usdc() {
		assert_eq!(to_base_units("10.50", 6).unwrap(), "10500000");
		assert_eq!(to_base_units("1.5", 6).unwrap(), "1500000");
		assert_eq!(to_base_units("1", 6).unwrap(), "1000000");
		assert_eq!(to_base_units("0.000001", 6).unwrap(), "1");
		assert_eq!(to_base_units(" 2.25 ", 6).unwrap(), "2250000");
	}

	#[test]
	fn test_to_base_units_truncates_extra_digits() {
		assert_eq!(to_base_units("1.2345678", 6).unwrap(), "1234567");
		assert_eq!(to_base_units("0.1234569", 6).unwrap(), "123456");
		assert_eq!(
			to_base_units("0.0000001", 6),
			Err(AmountError::BelowBaseUnit)
		);
	}

	#[test]
	fn test_to_base_units_rejects_bad_input() {
		assert!(matches!(
			to_base_units("ten", 6),
			Err(AmountError::NotANumber(_))
		));
		assert_eq!(to_base_units("0", 6), Err(AmountError::NotPositive));
		assert_eq!(to_base_units("-1", 6), Err(AmountError::NotPositive));
		assert_eq!(
			to_base_units("1", 40),
			Err(AmountError::Overflow { decimals: 40 })
		);
	}

	#[test]
	fn test_to_base_units_eighteen_decimals() {
		assert_eq!(to_base_units("1.5", 18).unwrap(), "1500000000000000000");
	}

	#[test]
	fn test_format_token_amount() {
		assert_eq!(format_token_amount("1500000", 6).as_deref(), Some("1.5"));
		assert_eq!(format_token_amount("1000000", 6).as_deref(), Some("1"));
		assert_eq!(format_token_amount("100000", 6).as_deref(), Some("0.1"));
		assert_eq!(format_token_amount("0", 6).as_deref(), Some("0"));
		assert_eq!(format_token_amount("1000", 0).as_deref(), Some("1000"));
		assert_eq!(format_token_amount("1.5", 6), None);
		assert_eq!(format_token_amount("abc", 6), None);
	}
}
