//! Order trends and top customers.

use chrono::NaiveDate;

use sales_dashboard_core::{Money, OrderSummary};

use super::{Bounds, RangeFilter, TOP_N, group_sum, mean_money, passes, sum_money, top_n};
use crate::export::TableRow;

/// Filter inputs for the orders page.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub amount_min: Option<Money>,
    pub amount_max: Option<Money>,
}

impl TableRow for OrderSummary {
    const COLUMNS: &'static [&'static str] = &[
        "order_id",
        "order_date",
        "total_amount",
        "customer_name",
        "phone",
        "month",
        "day",
    ];
    const DEFAULT_COLUMNS: &'static [&'static str] =
        &["order_id", "order_date", "customer_name", "total_amount"];

    fn cell(&self, column: &str) -> String {
        match column {
            "order_id" => self.id.to_string(),
            "order_date" => self.order_date.format("%Y-%m-%d %H:%M:%S").to_string(),
            "total_amount" => self
                .total_amount
                .map(|m| m.amount().to_string())
                .unwrap_or_default(),
            "customer_name" => self.customer_name.clone(),
            "phone" => self.phone.clone().unwrap_or_default(),
            "month" => self.month(),
            "day" => self.day().format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }
}

/// Orders page data.
#[derive(Debug, Clone)]
pub struct OrderReport {
    /// Filtered orders, newest first.
    pub rows: Vec<OrderSummary>,
    pub total: usize,
    pub date_bounds: Option<Bounds<NaiveDate>>,
    pub date_range: Option<RangeFilter<NaiveDate>>,
    pub amount_bounds: Option<Bounds<Money>>,
    pub amount_range: Option<RangeFilter<Money>>,
    pub revenue: Money,
    pub average: Option<Money>,
    pub highest: Option<Money>,
    /// `YYYY-MM` buckets in chronological order.
    pub monthly_revenue: Vec<(String, Money)>,
    pub monthly_count: Vec<(String, i64)>,
    pub daily_revenue: Vec<(NaiveDate, Money)>,
    pub top_customers: Vec<(String, Money)>,
}

impl OrderReport {
    #[must_use]
    pub fn build(orders: Vec<OrderSummary>, filter: OrderFilter) -> Self {
        let total = orders.len();

        let date_bounds = Bounds::observed(orders.iter().map(|o| Some(o.day())));
        let amount_bounds =
            Bounds::observed(orders.iter().map(|o| o.total_amount)).map(Bounds::widened);
        let date_range = RangeFilter::resolve(filter.from, filter.to, date_bounds);
        let amount_range =
            RangeFilter::resolve(filter.amount_min, filter.amount_max, amount_bounds);

        let rows: Vec<OrderSummary> = orders
            .into_iter()
            .filter(|o| {
                passes(date_range.as_ref(), Some(o.day()))
                    && passes(amount_range.as_ref(), o.total_amount)
            })
            .collect();

        let revenue = sum_money(rows.iter().map(|o| o.total_amount));
        let average = mean_money(rows.iter().map(|o| o.total_amount));
        let highest = rows.iter().filter_map(|o| o.total_amount).max();

        let monthly_revenue = group_sum(&rows, OrderSummary::month, |o| o.total_amount)
            .into_iter()
            .collect();
        let monthly_count = group_sum(&rows, OrderSummary::month, |_| Some(1_i64))
            .into_iter()
            .collect();
        let daily_revenue = group_sum(&rows, OrderSummary::day, |o| o.total_amount)
            .into_iter()
            .collect();
        let top_customers = top_n(
            group_sum(&rows, |o| o.customer_name.clone(), |o| o.total_amount),
            TOP_N,
        );

        Self {
            rows,
            total,
            date_bounds,
            date_range,
            amount_bounds,
            amount_range,
            revenue,
            average,
            highest,
            monthly_revenue,
            monthly_count,
            daily_revenue,
            top_customers,
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.rows.len()
    }
}
