//! Fixed-point decimal arithmetic.
//!
//! We depend on `rust_decimal` directly rather than hand-rolling a
//! fixed-point type — it already gives exact add/sub, round-toward-zero
//! multiply/divide, a canonical trailing-zero-free `to_string()` via
//! `.normalize()`, and bit-exact `Serialize`/`Deserialize`.
//!
//! The helpers below exist only to pin the scale to exactly 18 fractional
//! digits (`rust_decimal`'s scale otherwise tracks whatever the input
//! literal carried).

use crate::error::BookError;

pub use rust_decimal::Decimal;

/// Exactly 18 fractional decimal digits.
pub const SCALE: u32 = 18;

/// Parses a decimal string, truncating (not rounding) any fractional digits
/// beyond the 18th. Reports a [`BookError::InvalidDecimal`] rather than
/// propagating `rust_decimal`'s own error type past this crate's boundary.
pub fn parse_decimal18(s: &str) -> Result<Decimal, BookError> {
    let parsed: Decimal = s.parse().map_err(|e: rust_decimal::Error| BookError::InvalidDecimal {
        input: s.to_string(),
        reason: e.to_string(),
    })?;
    Ok(round_decimal18(parsed))
}

/// Truncates `d` to 18 fractional digits, rounding toward zero.
pub fn round_decimal18(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(SCALE, rust_decimal::RoundingStrategy::ToZero)
}

/// Canonical render: no trailing zeros, no decimal point when the value is
/// an integer (including zero).
pub fn render(d: Decimal) -> String {
    d.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn excess_fractional_digits_are_truncated_not_rounded() {
        let d = parse_decimal18("1.9999999999999999995").unwrap();
        assert_eq!(d, dec!(1.999999999999999999));
    }

    #[test]
    fn render_omits_trailing_zeros_and_point() {
        assert_eq!(render(dec!(1.500)), "1.5");
        assert_eq!(render(dec!(0.000)), "0");
        assert_eq!(render(dec!(-0.000)), "0");
    }

    #[test]
    fn addition_is_exact() {
        let a = dec!(0.1);
        let b = dec!(0.2);
        assert_eq!(a + b, dec!(0.3));
    }

    #[test]
    fn round_trip_through_string_is_bit_exact() {
        let d = dec!(12345.678901234567);
        let s = d.to_string();
        let parsed: Decimal = s.parse().unwrap();
        assert_eq!(d, parsed);
    }

    #[test]
    fn malformed_input_reports_invalid_decimal() {
        let err = parse_decimal18("not-a-number").unwrap_err();
        assert!(matches!(err, crate::BookError::InvalidDecimal { .. }));
    }
}
