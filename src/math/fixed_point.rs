// Fixed-point decimal amounts: an arbitrary-precision integer paired with an
// implicit power-of-ten scale. Token balances use the token's decimals as the
// scale, square-root prices use PRICE_SCALE and liquidity uses LIQUIDITY_SCALE.

use std::fmt;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};

use crate::error::MathError;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FixedPointAmount {
    pub value: BigUint,
    pub scale: u32,
}

/// Token amount in smallest units, scaled by the token's decimals.
pub type ScaledAmount = FixedPointAmount;

impl FixedPointAmount {
    pub fn new(value: BigUint, scale: u32) -> Self {
        Self { value, scale }
    }

    pub fn zero(scale: u32) -> Self {
        Self { value: BigUint::zero(), scale }
    }

    pub fn from_u128(value: u128, scale: u32) -> Self {
        Self { value: BigUint::from(value), scale }
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Parses a human-readable decimal string at the given scale.
    pub fn parse(text: &str, scale: u32) -> Result<Self, MathError> {
        Ok(Self { value: parse_display_string(text, scale)?, scale })
    }

    pub fn to_display_string(&self) -> String {
        to_display_string(&self.value, self.scale)
    }

    /// Lossy conversion for charting and display math.
    pub fn to_f64(&self) -> f64 {
        self.value.to_f64().unwrap_or(f64::MAX) / 10f64.powi(self.scale as i32)
    }

    pub fn checked_add(&self, other: &Self) -> Result<Self, MathError> {
        if self.scale != other.scale {
            return Err(MathError::ScaleMismatch { left: self.scale, right: other.scale });
        }
        Ok(Self { value: &self.value + &other.value, scale: self.scale })
    }
}

impl fmt::Display for FixedPointAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

// --------------------------------- Helpers ---------------------------------

#[inline]
pub fn pow10(exp: u32) -> BigUint {
    BigUint::from(10u32).pow(exp)
}

#[inline]
fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

/// Drops trailing fractional zeros (and a dangling point) from a well-formed
/// decimal string.
fn strip_fraction_zeros(text: &str) -> String {
    if !text.contains('.') {
        return text.to_string();
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

// ------------------------------ Conversions ---------------------------------

/// Renders `value / 10^decimals` as a decimal string with trailing fractional
/// zeros trimmed.
pub fn to_display_string(value: &BigUint, decimals: u32) -> String {
    let digits = value.to_str_radix(10);
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = if digits.len() <= decimals {
        format!("0.{}{}", "0".repeat(decimals - digits.len()), digits)
    } else {
        let (int_part, frac_part) = digits.split_at(digits.len() - decimals);
        format!("{}.{}", int_part, frac_part)
    };
    strip_fraction_zeros(&padded)
}

/// Inverse of [`to_display_string`]: `"12.3456"` at 4 decimals is `123456`.
/// More fractional digits than `decimals` is an error, never a silent zero.
pub fn parse_display_string(text: &str, decimals: u32) -> Result<BigUint, MathError> {
    let text = text.trim();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text, ""));

    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
        return Err(MathError::InvalidDecimal(text.to_string()));
    }
    if frac_part.len() > decimals as usize {
        return Err(MathError::PrecisionExceeded { digits: frac_part.len(), decimals });
    }

    let padding = "0".repeat(decimals as usize - frac_part.len());
    let digits = format!("{}{}{}", int_part, frac_part, padding);
    BigUint::parse_bytes(digits.as_bytes(), 10).ok_or_else(|| MathError::InvalidDecimal(text.to_string()))
}

/// Normalizes a decimal string for display: leading integer zeros and trailing
/// fractional zeros are removed. Unparsable input is reported, not echoed back.
pub fn trim_zeros(text: &str) -> Result<String, MathError> {
    let text = text.trim();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text, ""));
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
        return Err(MathError::InvalidDecimal(text.to_string()));
    }

    let int_trimmed = int_part.trim_start_matches('0');
    let int_trimmed = if int_trimmed.is_empty() { "0" } else { int_trimmed };
    Ok(strip_fraction_zeros(&format!("{}.{}", int_trimmed, frac_part)))
}

/// Ceiling division for non-negative integers.
pub fn ceil_div(a: &BigUint, b: &BigUint) -> Result<BigUint, MathError> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let (quotient, remainder) = a.div_rem(b);
    Ok(if remainder.is_zero() { quotient } else { quotient + BigUint::one() })
}

/// Number of fractional digits in a decimal string (`"1.250"` -> 3).
pub fn scale_from_string(text: &str) -> u32 {
    text.split_once('.').map(|(_, frac)| frac.len() as u32).unwrap_or(0)
}

/// Parses a decimal string at the smallest scale that represents it exactly.
pub fn string_to_min_decimal(text: &str) -> Result<FixedPointAmount, MathError> {
    FixedPointAmount::parse(text, scale_from_string(text.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_pads_small_values() {
        assert_eq!(to_display_string(&BigUint::from(5u32), 4), "0.0005");
        assert_eq!(to_display_string(&BigUint::from(1234u32), 4), "0.1234");
    }

    #[test]
    fn display_inserts_point() {
        assert_eq!(to_display_string(&BigUint::from(123456u32), 4), "12.3456");
        assert_eq!(to_display_string(&BigUint::from(1_000_000u32), 4), "100");
        assert_eq!(to_display_string(&BigUint::from(1_050_000u32), 4), "105");
        assert_eq!(to_display_string(&BigUint::from(1_005_000u32), 4), "100.5");
        assert_eq!(to_display_string(&BigUint::zero(), 6), "0");
        assert_eq!(to_display_string(&BigUint::from(42u32), 0), "42");
    }

    #[test]
    fn parse_pads_fraction() {
        assert_eq!(parse_display_string("12.3456", 4).unwrap(), BigUint::from(123456u32));
        assert_eq!(parse_display_string("12.3", 4).unwrap(), BigUint::from(123000u32));
        assert_eq!(parse_display_string("7", 6).unwrap(), BigUint::from(7_000_000u32));
        assert_eq!(parse_display_string(".5", 2).unwrap(), BigUint::from(50u32));
        assert_eq!(parse_display_string("5.", 2).unwrap(), BigUint::from(500u32));
    }

    #[test]
    fn parse_rejects_excess_precision() {
        assert_eq!(
            parse_display_string("0.00001", 4),
            Err(MathError::PrecisionExceeded { digits: 5, decimals: 4 })
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", ".", "abc", "1.2.3", "-1", "1e5", "1,5"] {
            assert!(
                matches!(parse_display_string(bad, 6), Err(MathError::InvalidDecimal(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn display_then_parse_is_identity() {
        for (v, d) in [(0u64, 6u32), (5, 4), (123456, 4), (1_000_000_000, 9), (10, 1)] {
            let text = to_display_string(&BigUint::from(v), d);
            assert_eq!(parse_display_string(&text, d).unwrap(), BigUint::from(v), "{text}");
        }
    }

    #[test]
    fn trim_zeros_normalizes_or_errors() {
        assert_eq!(trim_zeros("007.5000").unwrap(), "7.5");
        assert_eq!(trim_zeros("0.000").unwrap(), "0");
        assert_eq!(trim_zeros("120").unwrap(), "120");
        assert!(trim_zeros("twelve").is_err());
    }

    #[test]
    fn ceil_div_rounds_up() {
        let c = |a: u32, b: u32| ceil_div(&BigUint::from(a), &BigUint::from(b));
        assert_eq!(c(10, 5).unwrap(), BigUint::from(2u32));
        assert_eq!(c(11, 5).unwrap(), BigUint::from(3u32));
        assert_eq!(c(0, 7).unwrap(), BigUint::zero());
        assert_eq!(c(1, 0), Err(MathError::DivisionByZero));
    }

    #[test]
    fn min_decimal_uses_fraction_length() {
        assert_eq!(scale_from_string("1.250"), 3);
        assert_eq!(scale_from_string("42"), 0);
        let amount = string_to_min_decimal("1.250").unwrap();
        assert_eq!(amount, FixedPointAmount::from_u128(1250, 3));
    }

    #[test]
    fn add_requires_matching_scale() {
        let a = FixedPointAmount::from_u128(1, 6);
        let b = FixedPointAmount::from_u128(2, 6);
        assert_eq!(a.checked_add(&b).unwrap(), FixedPointAmount::from_u128(3, 6));
        let c = FixedPointAmount::from_u128(2, 9);
        assert_eq!(a.checked_add(&c), Err(MathError::ScaleMismatch { left: 6, right: 9 }));
    }
}
