//! Frequency normalization
//!
//! Every conversion goes through the annualized amount so that no pair of
//! units compounds its own rounding. Conversion never fails: unparseable or
//! non-finite input becomes zero, and so does a result too large for a
//! `Decimal`.

use crate::normalize::types::{Frequency, TimeUnit};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Annualize an amount billed at `frequency`
pub fn to_annual(amount: Decimal, frequency: Frequency) -> Decimal {
    amount
        .checked_mul(frequency.annual_multiplier())
        .unwrap_or(Decimal::ZERO)
}

/// Express an amount billed at `frequency` per `unit`
pub fn normalize(amount: Decimal, frequency: Frequency, unit: TimeUnit) -> Decimal {
    to_annual(amount, frequency)
        .checked_div(unit.divisor())
        .unwrap_or(Decimal::ZERO)
}

/// Sum amounts, pinning at `Decimal::MAX`/`Decimal::MIN` instead of overflowing
pub fn sum_amounts<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .fold(Decimal::ZERO, |acc, amount| acc.saturating_add(amount))
}

/// Coerce a stored amount string to a decimal
///
/// Strips `,` and `$`, then reads the longest leading numeric prefix
/// (`"12.5 USD"` reads as 12.5). Anything without a numeric prefix is zero.
pub fn coerce_amount(raw: &str) -> Decimal {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && *c != '$').collect();
    let prefix = numeric_prefix(cleaned.trim());
    if prefix.is_empty() {
        return Decimal::ZERO;
    }
    let (negative, unsigned) = match prefix.as_bytes()[0] {
        b'-' => (true, &prefix[1..]),
        b'+' => (false, &prefix[1..]),
        _ => (false, prefix),
    };
    let padded = if unsigned.starts_with('.') {
        format!("0{}", unsigned)
    } else {
        unsigned.to_string()
    };
    let value = Decimal::from_str(&padded).unwrap_or(Decimal::ZERO);
    if negative {
        -value
    } else {
        value
    }
}

/// Convert a float amount, mapping NaN and infinities to zero
pub fn amount_from_f64(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if frac_end > frac_start {
            end = frac_end;
        } else if digits > 0 {
            // "12." reads as 12
            return &s[..end];
        }
    }
    if digits == 0 {
        return "";
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_exact_multipliers() {
        assert_eq!(to_annual(d("100"), Frequency::Weekly), d("5200"));
        assert_eq!(to_annual(d("100"), Frequency::Monthly), d("1200"));
        assert_eq!(to_annual(d("100"), Frequency::Semimonthly), d("2400"));
        assert_eq!(to_annual(d("100"), Frequency::Biweekly), d("2600"));
        assert_eq!(to_annual(d("100"), Frequency::Annual), d("100"));
        assert_eq!(to_annual(d("100"), Frequency::Daily), d("36525"));
        assert_eq!(to_annual(d("100"), Frequency::Unspecified), d("1200"));
    }

    #[test]
    fn test_identity_at_matching_unit() {
        assert_eq!(normalize(d("49.99"), Frequency::Monthly, TimeUnit::Month), d("49.99"));
        assert_eq!(normalize(d("1200"), Frequency::Annual, TimeUnit::Year), d("1200"));
    }

    #[test]
    fn test_weekly_to_day() {
        // 52 * 73.05 / 365.25
        assert_eq!(normalize(d("73.05"), Frequency::Weekly, TimeUnit::Day), d("10.4"));
    }

    #[test]
    fn test_daily_to_hour() {
        assert_eq!(normalize(d("24"), Frequency::Daily, TimeUnit::Hour), d("1"));
    }

    #[test]
    fn test_coerce_amount() {
        assert_eq!(coerce_amount("1,234.50"), d("1234.50"));
        assert_eq!(coerce_amount("$99"), d("99"));
        assert_eq!(coerce_amount("-42.1"), d("-42.1"));
        assert_eq!(coerce_amount("12.5 USD"), d("12.5"));
        assert_eq!(coerce_amount("12."), d("12"));
        assert_eq!(coerce_amount(".5"), d("0.5"));
        assert_eq!(coerce_amount("abc"), Decimal::ZERO);
        assert_eq!(coerce_amount(""), Decimal::ZERO);
        assert_eq!(coerce_amount("-"), Decimal::ZERO);
        assert_eq!(coerce_amount("."), Decimal::ZERO);
    }

    #[test]
    fn test_non_finite_floats_are_zero() {
        assert_eq!(amount_from_f64(f64::NAN), Decimal::ZERO);
        assert_eq!(amount_from_f64(f64::INFINITY), Decimal::ZERO);
        assert_eq!(amount_from_f64(2.5), d("2.5"));
    }

    #[test]
    fn test_oversized_amount_normalizes_to_zero() {
        let huge = coerce_amount("10000000000000000000000000000");
        assert_eq!(to_annual(huge, Frequency::Weekly), Decimal::ZERO);
        assert_eq!(normalize(huge, Frequency::Weekly, TimeUnit::Year), Decimal::ZERO);
        assert_eq!(normalize(Decimal::MAX, Frequency::Daily, TimeUnit::Second), Decimal::ZERO);
        // annual billing needs no multiplication headroom
        assert_eq!(normalize(huge, Frequency::Annual, TimeUnit::Year), huge);
    }

    #[test]
    fn test_sum_amounts_saturates() {
        assert_eq!(sum_amounts([d("1.5"), d("2.25")]), d("3.75"));
        assert_eq!(sum_amounts([Decimal::MAX, d("1")]), Decimal::MAX);
        assert_eq!(sum_amounts(Vec::new()), Decimal::ZERO);
    }

    #[quickcheck]
    fn prop_year_equals_annual(cents: i64, which: u8) -> bool {
        let amount = Decimal::new(cents / 4, 2);
        let freq = Frequency::ALL[which as usize % Frequency::ALL.len()];
        normalize(amount, freq, TimeUnit::Year) == to_annual(amount, freq)
    }

    #[quickcheck]
    fn prop_monthly_identity(cents: i64) -> bool {
        let amount = Decimal::new(cents / 4, 2);
        normalize(amount, Frequency::Monthly, TimeUnit::Month) == amount
    }
}
