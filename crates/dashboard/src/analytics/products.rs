//! Product catalogue analysis: price and stock ranges, low-stock warnings.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use sales_dashboard_core::{Money, Product};

use super::{Bounds, FiveNumber, RangeFilter, TOP_N, five_number, passes, sum_money};
use crate::export::TableRow;

/// Bins in the price histogram.
pub const PRICE_BINS: usize = 20;

/// Filter inputs for the products page.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductFilter {
    pub price_min: Option<Money>,
    pub price_max: Option<Money>,
    pub stock_min: Option<i64>,
    pub stock_max: Option<i64>,
    pub low_stock: Option<i64>,
}

/// Stock level relative to the low-stock threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    Low,
    Normal,
}

impl StockStatus {
    #[must_use]
    pub const fn classify(stock: i64, threshold: i64) -> Self {
        if stock < threshold { Self::Low } else { Self::Normal }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Normal => "Normal",
        }
    }
}

/// A product with its stock status.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub product: Product,
    pub status: Option<StockStatus>,
}

impl ProductRow {
    #[must_use]
    pub fn inventory_value(&self) -> Option<Money> {
        self.product.inventory_value()
    }
}

impl TableRow for ProductRow {
    const COLUMNS: &'static [&'static str] = &[
        "product_id",
        "name",
        "description",
        "price",
        "stock",
        "stock_status",
    ];
    const DEFAULT_COLUMNS: &'static [&'static str] = &["product_id", "name", "price", "stock"];

    fn cell(&self, column: &str) -> String {
        let p = &self.product;
        match column {
            "product_id" => p.id.to_string(),
            "name" => p.name.clone(),
            "description" => p.description.clone().unwrap_or_default(),
            "price" => p.price.map(|m| m.amount().to_string()).unwrap_or_default(),
            "stock" => p.stock.map(|s| s.to_string()).unwrap_or_default(),
            "stock_status" => self.status.map(|s| s.label().to_string()).unwrap_or_default(),
            _ => String::new(),
        }
    }
}

/// One histogram bucket, `[lower, upper)` except the last which is closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramBin {
    pub lower: Money,
    pub upper: Money,
    pub count: usize,
}

/// Products page data.
#[derive(Debug, Clone)]
pub struct ProductReport {
    pub rows: Vec<ProductRow>,
    pub total: usize,
    pub price_bounds: Option<Bounds<Money>>,
    pub stock_bounds: Option<Bounds<i64>>,
    pub price_range: Option<RangeFilter<Money>>,
    pub stock_range: Option<RangeFilter<i64>>,
    pub threshold: i64,
    pub average_price: Option<Money>,
    pub total_stock: i64,
    pub inventory_value: Money,
    /// Low-stock products, stock ascending.
    pub low_stock: Vec<ProductRow>,
    pub top_by_price: Vec<(String, Money)>,
    pub stock_share: Vec<(String, i64)>,
    pub price_histogram: Vec<HistogramBin>,
    pub price_summary: Option<FiveNumber>,
    pub lowest_stock: Vec<(String, i64)>,
}

impl ProductReport {
    #[must_use]
    pub fn build(products: Vec<Product>, filter: ProductFilter, default_threshold: i64) -> Self {
        let total = products.len();
        let threshold = filter.low_stock.unwrap_or(default_threshold).max(0);

        let price_bounds = Bounds::observed(products.iter().map(|p| p.price)).map(Bounds::widened);
        let stock_bounds = Bounds::observed(products.iter().map(|p| p.stock)).map(Bounds::widened);
        let price_range = RangeFilter::resolve(filter.price_min, filter.price_max, price_bounds);
        let stock_range = RangeFilter::resolve(filter.stock_min, filter.stock_max, stock_bounds);

        let rows: Vec<ProductRow> = products
            .into_iter()
            .filter(|p| passes(price_range.as_ref(), p.price) && passes(stock_range.as_ref(), p.stock))
            .map(|product| ProductRow {
                status: product.stock.map(|s| StockStatus::classify(s, threshold)),
                product,
            })
            .collect();

        let average_price = super::mean_money(rows.iter().map(|r| r.product.price));
        let total_stock = rows.iter().filter_map(|r| r.product.stock).sum();
        let inventory_value = sum_money(rows.iter().map(ProductRow::inventory_value));

        let mut low_stock: Vec<ProductRow> = rows
            .iter()
            .filter(|r| r.status == Some(StockStatus::Low))
            .cloned()
            .collect();
        low_stock.sort_by_key(|r| r.product.stock);

        let top_by_price = super::top_n(
            rows.iter()
                .filter_map(|r| Some((r.product.name.clone(), r.product.price?))),
            TOP_N,
        );

        let stock_share = rows
            .iter()
            .filter_map(|r| Some((r.product.name.clone(), r.product.stock?)))
            .filter(|(_, stock)| *stock > 0)
            .collect();

        let prices: Vec<Money> = rows.iter().filter_map(|r| r.product.price).collect();
        let price_histogram = histogram(&prices, PRICE_BINS);
        let price_summary = five_number(prices.iter().copied().map(Some));

        let mut lowest_stock: Vec<(String, i64)> = rows
            .iter()
            .filter_map(|r| Some((r.product.name.clone(), r.product.stock?)))
            .collect();
        lowest_stock.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        lowest_stock.truncate(TOP_N);

        Self {
            rows,
            total,
            price_bounds,
            stock_bounds,
            price_range,
            stock_range,
            threshold,
            average_price,
            total_stock,
            inventory_value,
            low_stock,
            top_by_price,
            stock_share,
            price_histogram,
            price_summary,
            lowest_stock,
        }
    }

    /// Number of low-stock products.
    #[must_use]
    pub fn low_stock_count(&self) -> usize {
        self.low_stock.len()
    }

    /// Bar chart data of the low-stock products.
    #[must_use]
    pub fn low_stock_series(&self) -> Vec<(String, i64)> {
        self.low_stock
            .iter()
            .filter_map(|r| Some((r.product.name.clone(), r.product.stock?)))
            .collect()
    }
}

/// Equal-width histogram over `[min, max]`.
///
/// All-equal inputs produce one bin holding every value.
#[must_use]
pub fn histogram(values: &[Money], bins: usize) -> Vec<HistogramBin> {
    let Some(bounds) = Bounds::observed(values.iter().copied().map(Some)) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    if bounds.min == bounds.max {
        return vec![HistogramBin {
            lower: bounds.min,
            upper: bounds.max,
            count: values.len(),
        }];
    }

    let span = bounds.max.amount() - bounds.min.amount();
    let width = span / Decimal::from(bins);
    let mut counts = vec![0_usize; bins];
    for value in values {
        let offset = (value.amount() - bounds.min.amount()) / width;
        let index = offset.floor().to_usize().unwrap_or(0).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lower = bounds.min.amount() + width * Decimal::from(i);
            let upper = if i + 1 == bins {
                bounds.max.amount()
            } else {
                lower + width
            };
            HistogramBin {
                lower: Money::new(lower),
                upper: Money::new(upper),
                count,
            }
        })
        .collect()
}
