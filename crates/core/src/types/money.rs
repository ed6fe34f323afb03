//! Rupiah amounts using decimal arithmetic.
//!
//! Prices, order totals and subtotals are stored as `NUMERIC` in the sales
//! schema. They stay `Decimal` all the way to the template so sums never
//! pick up float rounding; only chart geometry converts to `f64`.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A monetary amount in Indonesian Rupiah.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Whole rupiah, e.g. `Money::from_units(150_000)`.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Parse a database text value. Returns `None` for anything non-numeric.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        raw.trim().parse::<Decimal>().ok().map(Self)
    }

    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Lossy conversion for chart scaling.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }

    /// Multiply by an integer quantity (stock, units sold).
    #[must_use]
    pub fn times(&self, quantity: i64) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Divide by a count, `None` when the count is zero.
    #[must_use]
    pub fn average_over(&self, count: usize) -> Option<Self> {
        if count == 0 {
            return None;
        }
        Some(Self(self.0 / Decimal::from(count)))
    }

    /// Format as `Rp 1,234,567` (rounded to whole rupiah).
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let digits = rounded.abs().trunc().to_string();
        let grouped = group_thousands(&digits);
        if negative {
            format!("-Rp {grouped}")
        } else {
            format!("Rp {grouped}")
        }
    }
}

/// Insert `,` between every group of three digits.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self {
        self.times(rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::from_units(0).display(), "Rp 0");
        assert_eq!(Money::from_units(999).display(), "Rp 999");
        assert_eq!(Money::from_units(1_000).display(), "Rp 1,000");
        assert_eq!(Money::from_units(1_234_567).display(), "Rp 1,234,567");
    }

    #[test]
    fn test_display_rounds_to_whole_rupiah() {
        let money = Money::parse_lenient("1500.50").unwrap();
        assert_eq!(money.display(), "Rp 1,501");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(Money::from_units(-2_500).display(), "-Rp 2,500");
    }

    #[test]
    fn test_parse_lenient_rejects_garbage() {
        assert!(Money::parse_lenient("n/a").is_none());
        assert!(Money::parse_lenient("").is_none());
        assert_eq!(Money::parse_lenient(" 42 "), Some(Money::from_units(42)));
    }

    #[test]
    fn test_sum_and_times() {
        let total: Money = [Money::from_units(10), Money::from_units(5)].iter().sum();
        assert_eq!(total, Money::from_units(15));
        assert_eq!(Money::from_units(2_000).times(3), Money::from_units(6_000));
    }

    #[test]
    fn test_average_over_zero_is_none() {
        assert!(Money::from_units(10).average_over(0).is_none());
        assert_eq!(
            Money::from_units(10).average_over(4),
            Some(Money::parse_lenient("2.5").unwrap())
        );
    }
}
