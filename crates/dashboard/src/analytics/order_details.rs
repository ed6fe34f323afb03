//! Order-line analysis: best sellers and daily sales.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use sales_dashboard_core::{Money, OrderLine};

use super::{
    Bounds, RangeFilter, TOP_N, distinct, group_sum, mean_i64, passes, sum_money, top_n,
};
use crate::export::TableRow;

/// Filter inputs for the order details page.
#[derive(Debug, Clone, Default)]
pub struct OrderDetailFilter {
    /// Product names to keep; empty keeps all.
    pub products: Vec<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub quantity_min: Option<i64>,
    pub quantity_max: Option<i64>,
    pub subtotal_min: Option<Money>,
    pub subtotal_max: Option<Money>,
}

impl TableRow for OrderLine {
    const COLUMNS: &'static [&'static str] = &[
        "order_detail_id",
        "order_id",
        "order_date",
        "customer_id",
        "customer_name",
        "product_id",
        "product_name",
        "unit_price",
        "quantity",
        "subtotal",
        "order_total",
        "phone",
        "day",
    ];
    const DEFAULT_COLUMNS: &'static [&'static str] = &[
        "order_id",
        "order_date",
        "customer_name",
        "product_name",
        "quantity",
        "subtotal",
    ];

    fn cell(&self, column: &str) -> String {
        let money = |m: Option<Money>| m.map(|m| m.amount().to_string()).unwrap_or_default();
        match column {
            "order_detail_id" => self.id.to_string(),
            "order_id" => self.order_id.to_string(),
            "order_date" => self.order_date.format("%Y-%m-%d %H:%M:%S").to_string(),
            "customer_id" => self.customer_id.to_string(),
            "customer_name" => self.customer_name.clone(),
            "product_id" => self.product_id.to_string(),
            "product_name" => self.product_name.clone(),
            "unit_price" => money(self.unit_price),
            "quantity" => self.quantity.map(|q| q.to_string()).unwrap_or_default(),
            "subtotal" => money(self.subtotal),
            "order_total" => money(self.order_total),
            "phone" => self.phone.clone().unwrap_or_default(),
            "day" => self.day().format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }
}

/// Per-product totals for the ranking table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRanking {
    pub product_name: String,
    pub total_sold: i64,
    pub revenue: Money,
    /// Order lines that included the product.
    pub lines: usize,
}

/// Order details page data.
#[derive(Debug, Clone)]
pub struct OrderDetailReport {
    pub rows: Vec<OrderLine>,
    pub total: usize,
    /// Every product name seen, sorted, for the product picker.
    pub product_options: Vec<String>,
    pub selected_products: Vec<String>,
    pub date_bounds: Option<Bounds<NaiveDate>>,
    pub date_range: Option<RangeFilter<NaiveDate>>,
    pub quantity_bounds: Option<Bounds<i64>>,
    pub quantity_range: Option<RangeFilter<i64>>,
    pub subtotal_bounds: Option<Bounds<Money>>,
    pub subtotal_range: Option<RangeFilter<Money>>,
    pub items_sold: i64,
    pub revenue: Money,
    pub average_quantity: Option<Decimal>,
    pub unique_products: usize,
    pub top_by_quantity: Vec<(String, i64)>,
    pub top_by_revenue: Vec<(String, Money)>,
    /// Quantity per product, product name order.
    pub quantity_share: Vec<(String, i64)>,
    pub daily_quantity: Vec<(NaiveDate, i64)>,
    pub daily_revenue: Vec<(NaiveDate, Money)>,
    /// Products by total sold, descending.
    pub ranking: Vec<ProductRanking>,
}

impl OrderDetailReport {
    #[must_use]
    pub fn build(lines: Vec<OrderLine>, filter: OrderDetailFilter) -> Self {
        let total = lines.len();
        let product_options: Vec<String> = lines
            .iter()
            .map(|l| l.product_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let date_bounds = Bounds::observed(lines.iter().map(|l| Some(l.day())));
        let quantity_bounds =
            Bounds::observed(lines.iter().map(|l| l.quantity)).map(Bounds::widened);
        let subtotal_bounds =
            Bounds::observed(lines.iter().map(|l| l.subtotal)).map(Bounds::widened);
        let date_range = RangeFilter::resolve(filter.from, filter.to, date_bounds);
        let quantity_range =
            RangeFilter::resolve(filter.quantity_min, filter.quantity_max, quantity_bounds);
        let subtotal_range =
            RangeFilter::resolve(filter.subtotal_min, filter.subtotal_max, subtotal_bounds);

        let selected_products = filter.products;
        let rows: Vec<OrderLine> = lines
            .into_iter()
            .filter(|l| selected_products.is_empty() || selected_products.contains(&l.product_name))
            .filter(|l| {
                passes(date_range.as_ref(), Some(l.day()))
                    && passes(quantity_range.as_ref(), l.quantity)
                    && passes(subtotal_range.as_ref(), l.subtotal)
            })
            .collect();

        let items_sold = rows.iter().filter_map(|l| l.quantity).sum();
        let revenue = sum_money(rows.iter().map(|l| l.subtotal));
        let average_quantity = mean_i64(rows.iter().map(|l| l.quantity));
        let unique_products = distinct(rows.iter().map(|l| l.product_name.as_str()));

        let quantity_by_product = group_sum(&rows, |l| l.product_name.clone(), |l| l.quantity);
        let revenue_by_product = group_sum(&rows, |l| l.product_name.clone(), |l| l.subtotal);

        let top_by_quantity = top_n(quantity_by_product.clone(), TOP_N);
        let top_by_revenue = top_n(revenue_by_product.clone(), TOP_N);
        let ranking = rank_products(&rows, &quantity_by_product, &revenue_by_product);
        let quantity_share = quantity_by_product.into_iter().collect();

        let daily_quantity = group_sum(&rows, OrderLine::day, |l| l.quantity)
            .into_iter()
            .collect();
        let daily_revenue = group_sum(&rows, OrderLine::day, |l| l.subtotal)
            .into_iter()
            .collect();

        Self {
            rows,
            total,
            product_options,
            selected_products,
            date_bounds,
            date_range,
            quantity_bounds,
            quantity_range,
            subtotal_bounds,
            subtotal_range,
            items_sold,
            revenue,
            average_quantity,
            unique_products,
            top_by_quantity,
            top_by_revenue,
            quantity_share,
            daily_quantity,
            daily_revenue,
            ranking,
        }
    }

    /// Average quantity with two decimals.
    #[must_use]
    pub fn average_quantity_display(&self) -> Option<String> {
        self.average_quantity.map(|q| format!("{:.2}", q.round_dp(2)))
    }
}

fn rank_products(
    rows: &[OrderLine],
    quantity: &BTreeMap<String, i64>,
    revenue: &BTreeMap<String, Money>,
) -> Vec<ProductRanking> {
    let lines = group_sum(rows, |l| l.product_name.clone(), |_| Some(1_usize));
    let mut ranking: Vec<ProductRanking> = lines
        .into_iter()
        .map(|(product_name, lines)| ProductRanking {
            total_sold: quantity.get(&product_name).copied().unwrap_or_default(),
            revenue: revenue.get(&product_name).copied().unwrap_or_default(),
            lines,
            product_name,
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.total_sold
            .cmp(&a.total_sold)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    ranking
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sales_dashboard_core::{CustomerId, OrderDetailId, OrderId, ProductId};

    use super::*;

    fn line(id: i32, date: &str, product: &str, quantity: Option<i64>, subtotal: i64) -> OrderLine {
        OrderLine {
            id: OrderDetailId::new(id),
            order_id: OrderId::new(id * 10),
            order_date: NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .unwrap()
                .and_hms_opt(8, 30, 0)
                .unwrap(),
            customer_id: CustomerId::new(1),
            customer_name: "Ani".to_string(),
            product_id: ProductId::new(1),
            product_name: product.to_string(),
            unit_price: None,
            quantity,
            subtotal: Some(Money::from_units(subtotal)),
            order_total: None,
            phone: None,
        }
    }

    fn lines() -> Vec<OrderLine> {
        vec![
            line(1, "2024-03-02", "Kopi", Some(3), 60_000),
            line(2, "2024-03-02", "Teh", Some(1), 5_000),
            line(3, "2024-03-01", "Kopi", Some(2), 40_000),
            line(4, "2024-03-01", "Gula", Some(4), 20_000),
        ]
    }

    #[test]
    fn test_metrics() {
        let report = OrderDetailReport::build(lines(), OrderDetailFilter::default());
        assert_eq!(report.items_sold, 10);
        assert_eq!(report.revenue, Money::from_units(125_000));
        assert_eq!(report.unique_products, 3);
        assert_eq!(report.average_quantity_display().unwrap(), "2.50");
        assert_eq!(report.product_options, ["Gula", "Kopi", "Teh"]);
    }

    #[test]
    fn test_product_selection() {
        let report = OrderDetailReport::build(
            lines(),
            OrderDetailFilter {
                products: vec!["Teh".to_string(), "Gula".to_string()],
                ..OrderDetailFilter::default()
            },
        );
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.total, 4);
    }

    #[test]
    fn test_ranking_by_total_sold() {
        let report = OrderDetailReport::build(lines(), OrderDetailFilter::default());
        let first = &report.ranking[0];
        assert_eq!(first.product_name, "Kopi");
        assert_eq!(first.total_sold, 5);
        assert_eq!(first.revenue, Money::from_units(100_000));
        assert_eq!(first.lines, 2);
        assert_eq!(report.ranking[1].product_name, "Gula");
        assert_eq!(report.top_by_revenue[0].0, "Kopi");
    }

    #[test]
    fn test_daily_series_chronological() {
        let report = OrderDetailReport::build(lines(), OrderDetailFilter::default());
        assert_eq!(
            report.daily_quantity,
            vec![
                (NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 6),
                (NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(), 4),
            ]
        );
    }

    #[test]
    fn test_missing_quantity_excluded() {
        let mut data = lines();
        data.push(line(5, "2024-03-03", "Teh", None, 1_000));
        let report = OrderDetailReport::build(data, OrderDetailFilter::default());
        assert_eq!(report.rows.len(), 4);
        assert_eq!(report.total, 5);
    }

    #[test]
    fn test_empty_lines() {
        let report = OrderDetailReport::build(Vec::new(), OrderDetailFilter::default());
        assert!(report.average_quantity_display().is_none());
        assert_eq!(report.items_sold, 0);
        assert!(report.ranking.is_empty());
    }
}
