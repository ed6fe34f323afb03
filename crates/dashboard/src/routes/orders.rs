//! Orders page and export.

use axum::{
    extract::{Query, RawQuery, State},
    response::{Html, Response},
};
use serde::Deserialize;
use tracing::instrument;

use sales_dashboard_core::{OrderSummary, View};

use super::{FilterField, Metric, ReportTemplate, csv_response, money_or_dash, render};
use crate::analytics::orders::OrderFilter;
use crate::analytics::{OrderReport, filter_notice, parse_date, parse_money};
use crate::charts::{BarChart, LineChart, ScatterChart};
use crate::db::{Entity, Fetched};
use crate::error::AppError;
use crate::export::{TableRow, TableView, select_columns, to_csv};
use crate::state::AppState;

/// Query parameters for the orders page.
#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    /// First order day, `YYYY-MM-DD`.
    pub from: Option<String>,
    /// Last order day, `YYYY-MM-DD`.
    pub to: Option<String>,
    pub amount_min: Option<String>,
    pub amount_max: Option<String>,
    pub columns: Option<String>,
}

impl OrderQuery {
    fn filter(&self) -> OrderFilter {
        OrderFilter {
            from: parse_date(self.from.as_deref()),
            to: parse_date(self.to.as_deref()),
            amount_min: parse_money(self.amount_min.as_deref()),
            amount_max: parse_money(self.amount_max.as_deref()),
        }
    }
}

async fn load(state: &AppState, query: &OrderQuery) -> (OrderReport, bool) {
    let fetched = Fetched::or_empty(
        Entity::Orders,
        state.store().fetch_orders_with_customers().await,
    );
    (OrderReport::build(fetched.rows, query.filter()), fetched.unavailable)
}

/// Orders page handler.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
    RawQuery(raw): RawQuery,
) -> Result<Html<String>, AppError> {
    let columns = select_columns::<OrderSummary>(query.columns.as_deref())?;
    let (report, unavailable) = load(&state, &query).await;

    let mut page = ReportTemplate::new(&state, View::Orders);
    page.mark_unavailable(Entity::Orders, unavailable);
    page.metrics = vec![
        Metric::new("📦 Total Orders", report.count()),
        Metric::new("💰 Total Revenue", report.revenue.display()),
        Metric::new("📊 Average Order", money_or_dash(report.average)),
        Metric::new("📈 Highest Order", money_or_dash(report.highest)),
    ];

    let dates = report.date_range;
    let amounts = report.amount_range;
    let mut from = FilterField::date("from", "From", dates.and_then(|r| r.min));
    let mut to = FilterField::date("to", "To", dates.and_then(|r| r.max));
    if let Some(b) = report.date_bounds {
        from = from.within(b.min, b.max);
        to = to.within(b.min, b.max);
    }
    let mut amount_min = FilterField::number(
        "amount_min",
        "Minimum total (Rp)",
        amounts.and_then(|r| r.min).map(|m| m.amount()),
    );
    let mut amount_max = FilterField::number(
        "amount_max",
        "Maximum total (Rp)",
        amounts.and_then(|r| r.max).map(|m| m.amount()),
    );
    if let Some(b) = report.amount_bounds {
        amount_min = amount_min.within(b.min.amount(), b.max.amount());
        amount_max = amount_max.within(b.min.amount(), b.max.amount());
    }
    page.filters = vec![
        from,
        to,
        amount_min,
        amount_max,
        FilterField::text("columns", "Columns", columns.join(","))
            .hint(format!("Available: {}", OrderSummary::COLUMNS.join(", "))),
    ];
    page.notices.extend(filter_notice(report.count(), report.total, "orders"));

    page.line_charts = vec![
        LineChart::money("Revenue per month", &report.monthly_revenue),
        LineChart::money("Daily revenue trend", &report.daily_revenue),
    ];
    page.bar_charts = vec![
        BarChart::count("Orders per month", &report.monthly_count),
        BarChart::money("Top 10 customers by total purchase", &report.top_customers),
    ];
    page.scatter_charts = vec![date_total_scatter(&report.rows)];

    page.set_table(
        TableView::build(&report.rows, &columns),
        &columns,
        OrderSummary::COLUMNS,
        "/orders/export.csv",
        raw.as_deref(),
    );

    render(&page)
}

/// Order time against total, hovered by customer.
fn date_total_scatter(rows: &[OrderSummary]) -> ScatterChart {
    ScatterChart::new(
        "Orders by date and amount",
        "Order date",
        "Total (Rp)",
        rows.iter().filter_map(|o| {
            let total = o.total_amount?;
            #[allow(clippy::cast_precision_loss)]
            let x = o.order_date.and_utc().timestamp() as f64;
            Some((
                o.customer_name.clone(),
                x,
                total.to_f64(),
                format!("{} · {}", o.order_date.format("%Y-%m-%d"), total.display()),
            ))
        }),
    )
}

/// CSV export of the filtered orders.
#[instrument(skip(state))]
pub async fn export(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> Result<Response, AppError> {
    let columns = select_columns::<OrderSummary>(query.columns.as_deref())?;
    let (report, _) = load(&state, &query).await;
    tracing::info!(rows = report.count(), "Exporting orders");
    Ok(csv_response("orders.csv", to_csv(&report.rows, &columns)))
}
