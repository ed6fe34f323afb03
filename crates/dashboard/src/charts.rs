//! Chart series rendered server-side as CSS bars and SVG shapes.
//!
//! Values are scaled here so templates only place precomputed geometry.

use std::fmt::Display;

use sales_dashboard_core::Money;

use crate::analytics::FiveNumber;

/// Width of the line chart viewBox.
pub const LINE_WIDTH: f64 = 600.0;
/// Height of the line chart viewBox.
pub const LINE_HEIGHT: f64 = 220.0;
const LINE_PADDING: f64 = 12.0;
/// Height of the scatter chart viewBox.
pub const SCATTER_HEIGHT: f64 = 300.0;
/// Height of the box plot viewBox.
pub const BOX_HEIGHT: f64 = 60.0;

/// One horizontal bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: String,
    /// Bar length as a percentage of the longest bar.
    pub percent: f64,
}

/// A titled set of bars.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub bars: Vec<Bar>,
}

impl BarChart {
    /// Build from `(label, magnitude, display value)` triples.
    pub fn new<I>(title: impl Into<String>, series: I) -> Self
    where
        I: IntoIterator<Item = (String, f64, String)>,
    {
        let series: Vec<_> = series.into_iter().collect();
        let max = series.iter().map(|(_, v, _)| *v).fold(0.0_f64, f64::max);
        let bars = series
            .into_iter()
            .map(|(label, value, display)| Bar {
                label,
                value: display,
                percent: scale(value, max),
            })
            .collect();
        Self {
            title: title.into(),
            bars,
        }
    }

    pub fn money<K: Display>(title: impl Into<String>, series: &[(K, Money)]) -> Self {
        Self::new(
            title,
            series
                .iter()
                .map(|(k, m)| (k.to_string(), m.to_f64(), m.display())),
        )
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn count<K: Display>(title: impl Into<String>, series: &[(K, i64)]) -> Self {
        Self::new(
            title,
            series
                .iter()
                .map(|(k, v)| (k.to_string(), *v as f64, v.to_string())),
        )
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Part-of-whole breakdown, each slice a percentage of the total.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareChart {
    pub title: String,
    pub slices: Vec<Bar>,
}

impl ShareChart {
    /// Build from non-negative integer parts. Zero parts are dropped.
    pub fn new<K: Display>(title: impl Into<String>, parts: &[(K, i64)]) -> Self {
        let parts: Vec<_> = parts.iter().filter(|(_, v)| *v > 0).collect();
        #[allow(clippy::cast_precision_loss)]
        let total: f64 = parts.iter().map(|(_, v)| *v as f64).sum();
        let slices = parts
            .into_iter()
            .map(|(k, v)| {
                #[allow(clippy::cast_precision_loss)]
                let percent = scale(*v as f64, total);
                Bar {
                    label: k.to_string(),
                    value: format!("{v} ({percent:.1}%)"),
                    percent,
                }
            })
            .collect();
        Self {
            title: title.into(),
            slices,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

/// A plotted point with its hover text.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub label: String,
    pub value: String,
    pub x: f64,
    pub y: f64,
}

/// Line chart over an ordered series.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub points: Vec<Point>,
}

impl LineChart {
    /// Build from `(label, magnitude, display value)` in plotting order.
    pub fn new<I>(title: impl Into<String>, series: I) -> Self
    where
        I: IntoIterator<Item = (String, f64, String)>,
    {
        let series: Vec<_> = series.into_iter().collect();
        let max = series.iter().map(|(_, v, _)| *v).fold(0.0_f64, f64::max);
        let inner_w = LINE_WIDTH - 2.0 * LINE_PADDING;
        let inner_h = LINE_HEIGHT - 2.0 * LINE_PADDING;
        let centered = series.len() < 2;
        #[allow(clippy::cast_precision_loss)]
        let step = if centered {
            0.0
        } else {
            inner_w / (series.len() - 1) as f64
        };

        let points = series
            .into_iter()
            .enumerate()
            .map(|(i, (label, value, display))| {
                #[allow(clippy::cast_precision_loss)]
                let x = if centered {
                    LINE_WIDTH / 2.0
                } else {
                    LINE_PADDING + step * i as f64
                };
                let y = LINE_PADDING + inner_h * (1.0 - scale(value, max) / 100.0);
                Point {
                    label,
                    value: display,
                    x: round1(x),
                    y: round1(y),
                }
            })
            .collect();

        Self {
            title: title.into(),
            points,
        }
    }

    pub fn money<K: Display>(title: impl Into<String>, series: &[(K, Money)]) -> Self {
        Self::new(
            title,
            series
                .iter()
                .map(|(k, m)| (k.to_string(), m.to_f64(), m.display())),
        )
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn count<K: Display>(title: impl Into<String>, series: &[(K, i64)]) -> Self {
        Self::new(
            title,
            series
                .iter()
                .map(|(k, v)| (k.to_string(), *v as f64, v.to_string())),
        )
    }

    /// SVG `viewBox` matching the plotted geometry.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn view_box(&self) -> String {
        format!("0 0 {LINE_WIDTH} {LINE_HEIGHT}")
    }

    /// SVG `points` attribute for the polyline.
    #[must_use]
    pub fn polyline(&self) -> String {
        self.points
            .iter()
            .map(|p| format!("{},{}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Two measures per row, each axis spanning its observed range.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub points: Vec<Point>,
}

impl ScatterChart {
    /// Build from `(hover label, x, y, display value)`. Non-finite points are dropped.
    pub fn new<I>(
        title: impl Into<String>,
        x_label: &'static str,
        y_label: &'static str,
        series: I,
    ) -> Self
    where
        I: IntoIterator<Item = (String, f64, f64, String)>,
    {
        let series: Vec<_> = series
            .into_iter()
            .filter(|(_, x, y, _)| x.is_finite() && y.is_finite())
            .collect();
        let x_span = span(series.iter().map(|(_, x, _, _)| *x));
        let y_span = span(series.iter().map(|(_, _, y, _)| *y));
        let inner_w = LINE_WIDTH - 2.0 * LINE_PADDING;
        let inner_h = SCATTER_HEIGHT - 2.0 * LINE_PADDING;

        let points = series
            .into_iter()
            .map(|(label, x, y, display)| Point {
                label,
                value: display,
                x: round1(LINE_PADDING + inner_w * fraction(x, x_span)),
                y: round1(LINE_PADDING + inner_h * (1.0 - fraction(y, y_span))),
            })
            .collect();

        Self {
            title: title.into(),
            x_label,
            y_label,
            points,
        }
    }

    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn view_box(&self) -> String {
        format!("0 0 {LINE_WIDTH} {SCATTER_HEIGHT}")
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Horizontal box plot of a five-number summary, whiskers at the extremes.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxChart {
    pub title: String,
    /// `(name, display value)` from minimum to maximum.
    pub stats: Vec<(&'static str, String)>,
    pub min_x: f64,
    pub q1_x: f64,
    pub median_x: f64,
    pub q3_x: f64,
    pub max_x: f64,
}

impl BoxChart {
    pub fn money(title: impl Into<String>, summary: Option<&FiveNumber>) -> Self {
        let title = title.into();
        let Some(s) = summary else {
            return Self {
                title,
                stats: Vec::new(),
                min_x: 0.0,
                q1_x: 0.0,
                median_x: 0.0,
                q3_x: 0.0,
                max_x: 0.0,
            };
        };

        let range = (s.min.to_f64(), s.max.to_f64());
        let inner_w = LINE_WIDTH - 2.0 * LINE_PADDING;
        let at = |m: Money| round1(LINE_PADDING + inner_w * fraction(m.to_f64(), range));
        Self {
            title,
            stats: vec![
                ("Min", s.min.display()),
                ("Q1", s.q1.display()),
                ("Median", s.median.display()),
                ("Q3", s.q3.display()),
                ("Max", s.max.display()),
            ],
            min_x: at(s.min),
            q1_x: at(s.q1),
            median_x: at(s.median),
            q3_x: at(s.q3),
            max_x: at(s.max),
        }
    }

    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn view_box(&self) -> String {
        format!("0 0 {LINE_WIDTH} {BOX_HEIGHT}")
    }

    /// Width of the interquartile box.
    #[must_use]
    pub fn box_width(&self) -> f64 {
        round1(self.q3_x - self.q1_x)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

/// Observed `(min, max)` of the values.
fn span<I: IntoIterator<Item = f64>>(values: I) -> (f64, f64) {
    values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
}

/// Position of `value` within `(min, max)` as `0..=1`. A flat range sits in the middle.
fn fraction(value: f64, (min, max): (f64, f64)) -> f64 {
    if max > min {
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    } else {
        0.5
    }
}

/// `value` as a percentage of `max`, clamped to `0..=100`.
fn scale(value: f64, max: f64) -> f64 {
    if max <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    round1((value / max * 100.0).clamp(0.0, 100.0))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_bars_scale_to_largest() {
        let chart = BarChart::count("Stock", &[("Kopi", 50_i64), ("Teh", 25)]);
        assert_eq!(chart.bars[0].percent, 100.0);
        assert_eq!(chart.bars[1].percent, 50.0);
        assert_eq!(chart.bars[1].value, "25");
    }

    #[test]
    fn test_money_bars_use_rupiah_labels() {
        let chart = BarChart::money("Revenue", &[("Ani", Money::from_units(1_250_000))]);
        assert_eq!(chart.bars[0].value, "Rp 1,250,000");
    }

    #[test]
    fn test_shares_sum_to_hundred_and_drop_zero() {
        let chart = ShareChart::new("Share", &[("a", 1_i64), ("b", 3), ("c", 0)]);
        assert_eq!(chart.slices.len(), 2);
        assert_eq!(chart.slices[0].percent, 25.0);
        assert_eq!(chart.slices[1].value, "3 (75.0%)");
    }

    #[test]
    fn test_line_points_span_width() {
        let chart = LineChart::count("Qty", &[("d1", 0_i64), ("d2", 5), ("d3", 10)]);
        let first = &chart.points[0];
        let last = &chart.points[2];
        assert_eq!(first.x, LINE_PADDING);
        assert_eq!(last.x, LINE_WIDTH - LINE_PADDING);
        // Zero sits on the baseline, the maximum at the top.
        assert_eq!(first.y, LINE_HEIGHT - LINE_PADDING);
        assert_eq!(last.y, LINE_PADDING);
        assert_eq!(chart.polyline().split(' ').count(), 3);
    }

    #[test]
    fn test_single_point_is_centered() {
        let chart = LineChart::count("Qty", &[("d1", 4_i64)]);
        assert_eq!(chart.points[0].x, LINE_WIDTH / 2.0);
    }

    #[test]
    fn test_empty_series() {
        assert!(BarChart::count::<&str>("x", &[]).is_empty());
        assert!(LineChart::count::<&str>("x", &[]).is_empty());
        assert!(ShareChart::new::<&str>("x", &[]).is_empty());
        assert!(ScatterChart::new("x", "a", "b", Vec::new()).is_empty());
        assert!(BoxChart::money("x", None).is_empty());
    }

    #[test]
    fn test_scatter_spans_both_axes() {
        let chart = ScatterChart::new(
            "Price vs stock",
            "Price (Rp)",
            "Stock",
            vec![
                ("Kopi".to_string(), 40_000.0, 5.0, "a".to_string()),
                ("Gula".to_string(), 10_000.0, 50.0, "b".to_string()),
                ("Teh".to_string(), 25_000.0, f64::NAN, "c".to_string()),
            ],
        );
        assert_eq!(chart.points.len(), 2);
        let kopi = &chart.points[0];
        let gula = &chart.points[1];
        // Highest price on the right, lowest stock on the baseline.
        assert_eq!(kopi.x, LINE_WIDTH - LINE_PADDING);
        assert_eq!(kopi.y, SCATTER_HEIGHT - LINE_PADDING);
        assert_eq!(gula.x, LINE_PADDING);
        assert_eq!(gula.y, LINE_PADDING);
        assert_eq!(kopi.label, "Kopi");
    }

    #[test]
    fn test_scatter_single_point_is_centered() {
        let chart = ScatterChart::new(
            "x",
            "a",
            "b",
            vec![("only".to_string(), 3.0, 3.0, "3".to_string())],
        );
        assert_eq!(chart.points[0].x, LINE_WIDTH / 2.0);
        assert_eq!(chart.points[0].y, SCATTER_HEIGHT / 2.0);
    }

    #[test]
    fn test_box_places_quartiles_between_whiskers() {
        let summary = FiveNumber {
            min: Money::from_units(0),
            q1: Money::from_units(25),
            median: Money::from_units(50),
            q3: Money::from_units(75),
            max: Money::from_units(100),
        };
        let chart = BoxChart::money("Price", Some(&summary));
        assert_eq!(chart.min_x, LINE_PADDING);
        assert_eq!(chart.max_x, LINE_WIDTH - LINE_PADDING);
        assert_eq!(chart.median_x, LINE_WIDTH / 2.0);
        assert_eq!(chart.box_width(), (LINE_WIDTH - 2.0 * LINE_PADDING) / 2.0);
        assert_eq!(chart.stats[2], ("Median", "Rp 50".to_string()));
    }
}
