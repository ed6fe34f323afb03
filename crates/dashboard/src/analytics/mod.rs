//! Report computations behind each dashboard page.
//!
//! Every page follows the same shape: take the freshly fetched rows, resolve
//! the filter inputs against the observed value ranges, keep the matching
//! rows, then derive metrics and chart series from what is left. Nothing in
//! here touches the store or the HTTP layer.

pub mod customers;
pub mod order_details;
pub mod orders;
pub mod overview;
pub mod products;

use std::collections::BTreeMap;
use std::hash::Hash;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use sales_dashboard_core::Money;

pub use customers::{CustomerReport, CustomerRow};
pub use order_details::{OrderDetailReport, ProductRanking};
pub use orders::OrderReport;
pub use overview::Overview;
pub use products::{ProductReport, ProductRow, StockStatus};

/// Number of entries kept by the top-N charts.
pub const TOP_N: usize = 10;

/// A value type that can widen a degenerate input range.
pub trait Widen: Copy + PartialOrd {
    /// The value just past `self` used as the upper bound when min == max.
    #[must_use]
    fn widen(self) -> Self;
}

impl Widen for i64 {
    fn widen(self) -> Self {
        self.saturating_add(1)
    }
}

impl Widen for Money {
    fn widen(self) -> Self {
        self + Money::from_units(1_000)
    }
}

/// Observed minimum and maximum of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

impl<T: Copy + PartialOrd> Bounds<T> {
    /// Min and max over the present values, `None` when there are none.
    pub fn observed<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = Option<T>>,
    {
        values.into_iter().flatten().fold(None, |acc, v| match acc {
            None => Some(Self { min: v, max: v }),
            Some(b) => Some(Self {
                min: if v < b.min { v } else { b.min },
                max: if v > b.max { v } else { b.max },
            }),
        })
    }
}

impl<T: Widen> Bounds<T> {
    /// Input-domain bounds: a single observed value is widened so the
    /// range input still has two distinct ends.
    #[must_use]
    pub fn widened(self) -> Self {
        if self.max <= self.min {
            Self {
                min: self.min,
                max: self.min.widen(),
            }
        } else {
            self
        }
    }
}

/// Inclusive range filter with optional ends.
///
/// A missing value never matches, even when both ends are open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeFilter<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: Copy + PartialOrd> RangeFilter<T> {
    /// Combine requested ends with the observed bounds.
    ///
    /// Returns `None` (no filtering at all) when neither a request nor an
    /// observation provides an end.
    pub fn resolve(min: Option<T>, max: Option<T>, bounds: Option<Bounds<T>>) -> Option<Self> {
        let min = min.or(bounds.map(|b| b.min));
        let max = max.or(bounds.map(|b| b.max));
        if min.is_none() && max.is_none() {
            None
        } else {
            Some(Self { min, max })
        }
    }

    #[must_use]
    pub fn contains(&self, value: Option<T>) -> bool {
        value.is_some_and(|v| {
            self.min.is_none_or(|min| v >= min) && self.max.is_none_or(|max| v <= max)
        })
    }
}

/// Apply an optional filter; no filter keeps everything.
pub fn passes<T: Copy + PartialOrd>(filter: Option<&RangeFilter<T>>, value: Option<T>) -> bool {
    filter.is_none_or(|f| f.contains(value))
}

// =============================================================================
// Query-string parsing
// =============================================================================

/// Parse an optional form value, treating blanks and junk as unset.
#[must_use]
pub fn parse_i64(raw: Option<&str>) -> Option<i64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<i64>().ok())
}

#[must_use]
pub fn parse_money(raw: Option<&str>) -> Option<Money> {
    raw.and_then(Money::parse_lenient)
}

#[must_use]
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

// =============================================================================
// Aggregation helpers
// =============================================================================

/// Sum of the present amounts. Zero for an empty input.
pub fn sum_money<I: IntoIterator<Item = Option<Money>>>(values: I) -> Money {
    values.into_iter().flatten().sum()
}

/// Mean of the present amounts, `None` when there are none.
pub fn mean_money<I: IntoIterator<Item = Option<Money>>>(values: I) -> Option<Money> {
    let present: Vec<Money> = values.into_iter().flatten().collect();
    present.iter().sum::<Money>().average_over(present.len())
}

/// Mean of the present integers, `None` when there are none.
pub fn mean_i64<I: IntoIterator<Item = Option<i64>>>(values: I) -> Option<Decimal> {
    let present: Vec<i64> = values.into_iter().flatten().collect();
    if present.is_empty() {
        return None;
    }
    let total: i64 = present.iter().sum();
    Some(Decimal::from(total) / Decimal::from(present.len()))
}

/// Minimum, quartiles and maximum of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiveNumber {
    pub min: Money,
    pub q1: Money,
    pub median: Money,
    pub q3: Money,
    pub max: Money,
}

/// Five-number summary of the present amounts, `None` when there are none.
///
/// Quartiles interpolate linearly between the two nearest ranks.
pub fn five_number<I: IntoIterator<Item = Option<Money>>>(values: I) -> Option<FiveNumber> {
    let mut sorted: Vec<Decimal> = values.into_iter().flatten().map(|m| m.amount()).collect();
    sorted.sort_unstable();
    let last = sorted.len().checked_sub(1)?;

    let quantile = |p: Decimal| -> Option<Money> {
        let rank = Decimal::from(last) * p;
        let lower = rank.floor();
        let i = lower.to_usize()?;
        let low = *sorted.get(i)?;
        let high = sorted.get(i + 1).copied().unwrap_or(low);
        Some(Money::new(low + (high - low) * (rank - lower)))
    };

    Some(FiveNumber {
        min: quantile(Decimal::ZERO)?,
        q1: quantile(Decimal::new(25, 2))?,
        median: quantile(Decimal::new(5, 1))?,
        q3: quantile(Decimal::new(75, 2))?,
        max: quantile(Decimal::ONE)?,
    })
}

/// Group and sum by a sortable key; iteration order is key order.
pub fn group_sum<T, K, V, FK, FV>(rows: &[T], key: FK, value: FV) -> BTreeMap<K, V>
where
    K: Ord,
    V: Default + std::ops::Add<Output = V>,
    FK: Fn(&T) -> K,
    FV: Fn(&T) -> Option<V>,
{
    let mut groups: BTreeMap<K, V> = BTreeMap::new();
    for row in rows {
        // Rows with a missing value still open their group.
        let entry = groups.entry(key(row)).or_default();
        if let Some(v) = value(row) {
            *entry = std::mem::take(entry) + v;
        }
    }
    groups
}

/// Largest values first, ties broken by label, truncated to `n`.
pub fn top_n<K, V>(groups: impl IntoIterator<Item = (K, V)>, n: usize) -> Vec<(K, V)>
where
    K: Ord,
    V: Ord,
{
    let mut entries: Vec<(K, V)> = groups.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(n);
    entries
}

/// Count of distinct keys.
pub fn distinct<K: Eq + Hash, I: IntoIterator<Item = K>>(keys: I) -> usize {
    keys.into_iter()
        .collect::<std::collections::HashSet<_>>()
        .len()
}

/// "showing N of M" notice when a filter removed rows.
#[must_use]
pub fn filter_notice(shown: usize, total: usize, noun: &str) -> Option<String> {
    (shown < total).then(|| format!("Showing {shown} of {total} {noun} matching the selected filters"))
}
