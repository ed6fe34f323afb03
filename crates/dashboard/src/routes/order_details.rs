//! Order details page and export.

use axum::{
    extract::{Query, RawQuery, State},
    response::{Html, Response},
};
use serde::Deserialize;
use tracing::instrument;

use sales_dashboard_core::{OrderLine, View};

use super::{
    FilterField, Metric, NO_VALUE, ReportTemplate, TitledTable, csv_response, render,
};
use crate::analytics::order_details::OrderDetailFilter;
use crate::analytics::{
    OrderDetailReport, ProductRanking, filter_notice, parse_date, parse_i64, parse_money,
};
use crate::charts::{BarChart, LineChart, ScatterChart, ShareChart};
use crate::db::{Entity, Fetched};
use crate::error::AppError;
use crate::export::{TableRow, TableView, select_columns, to_csv};
use crate::state::AppState;

/// Query parameters for the order details page.
#[derive(Debug, Default, Deserialize)]
pub struct OrderDetailQuery {
    /// One entry per repeated `products` parameter.
    #[serde(skip)]
    pub products: Vec<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub quantity_min: Option<String>,
    pub quantity_max: Option<String>,
    pub subtotal_min: Option<String>,
    pub subtotal_max: Option<String>,
    pub columns: Option<String>,
}

impl OrderDetailQuery {
    /// Take the product selection from the decoded query pairs.
    #[must_use]
    pub fn with_products(mut self, params: Vec<(String, String)>) -> Self {
        self.products = params
            .into_iter()
            .filter(|(key, value)| key == "products" && !value.is_empty())
            .map(|(_, value)| value)
            .collect();
        self
    }

    fn filter(&self) -> OrderDetailFilter {
        OrderDetailFilter {
            products: self.products.clone(),
            from: parse_date(self.from.as_deref()),
            to: parse_date(self.to.as_deref()),
            quantity_min: parse_i64(self.quantity_min.as_deref()),
            quantity_max: parse_i64(self.quantity_max.as_deref()),
            subtotal_min: parse_money(self.subtotal_min.as_deref()),
            subtotal_max: parse_money(self.subtotal_max.as_deref()),
        }
    }
}

async fn load(state: &AppState, query: &OrderDetailQuery) -> (OrderDetailReport, bool) {
    let fetched = Fetched::or_empty(
        Entity::OrderDetails,
        state.store().fetch_order_details_with_info().await,
    );
    (
        OrderDetailReport::build(fetched.rows, query.filter()),
        fetched.unavailable,
    )
}

/// Order details page handler.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<OrderDetailQuery>,
    Query(params): Query<Vec<(String, String)>>,
    RawQuery(raw): RawQuery,
) -> Result<Html<String>, AppError> {
    let query = query.with_products(params);
    let columns = select_columns::<OrderLine>(query.columns.as_deref())?;
    let (report, unavailable) = load(&state, &query).await;

    let mut page = ReportTemplate::new(&state, View::OrderDetails);
    page.mark_unavailable(Entity::OrderDetails, unavailable);
    page.metrics = vec![
        Metric::new("📦 Items Sold", report.items_sold),
        Metric::new("💰 Total Revenue", report.revenue.display()),
        Metric::new(
            "📊 Average Quantity",
            report
                .average_quantity_display()
                .unwrap_or_else(|| NO_VALUE.to_string()),
        ),
        Metric::new("🏷️ Unique Products", report.unique_products),
    ];

    let dates = report.date_range;
    let mut from = FilterField::date("from", "From", dates.and_then(|r| r.min));
    let mut to = FilterField::date("to", "To", dates.and_then(|r| r.max));
    if let Some(b) = report.date_bounds {
        from = from.within(b.min, b.max);
        to = to.within(b.min, b.max);
    }
    let quantity = report.quantity_range;
    let mut quantity_min = FilterField::number(
        "quantity_min",
        "Minimum quantity",
        quantity.and_then(|r| r.min),
    );
    let mut quantity_max = FilterField::number(
        "quantity_max",
        "Maximum quantity",
        quantity.and_then(|r| r.max),
    );
    if let Some(b) = report.quantity_bounds {
        quantity_min = quantity_min.within(b.min, b.max);
        quantity_max = quantity_max.within(b.min, b.max);
    }
    let subtotal = report.subtotal_range;
    let mut subtotal_min = FilterField::number(
        "subtotal_min",
        "Minimum subtotal (Rp)",
        subtotal.and_then(|r| r.min).map(|m| m.amount()),
    );
    let mut subtotal_max = FilterField::number(
        "subtotal_max",
        "Maximum subtotal (Rp)",
        subtotal.and_then(|r| r.max).map(|m| m.amount()),
    );
    if let Some(b) = report.subtotal_bounds {
        subtotal_min = subtotal_min.within(b.min.amount(), b.max.amount());
        subtotal_max = subtotal_max.within(b.min.amount(), b.max.amount());
    }
    page.filters = vec![
        FilterField::multi_select(
            "products",
            "Products",
            &report.product_options,
            &report.selected_products,
        ),
        from,
        to,
        quantity_min,
        quantity_max,
        subtotal_min,
        subtotal_max,
        FilterField::text("columns", "Columns", columns.join(","))
            .hint(format!("Available: {}", OrderLine::COLUMNS.join(", "))),
    ];
    page.notices.extend(filter_notice(
        report.rows.len(),
        report.total,
        "order lines",
    ));

    page.bar_charts = vec![
        BarChart::count("Top 10 products by quantity sold", &report.top_by_quantity),
        BarChart::money("Top 10 products by revenue", &report.top_by_revenue),
    ];
    page.share_charts = vec![ShareChart::new(
        "Quantity share per product",
        &report.quantity_share,
    )];
    page.line_charts = vec![
        LineChart::count("Items sold per day", &report.daily_quantity),
        LineChart::money("Revenue per day", &report.daily_revenue),
    ];
    page.scatter_charts = vec![quantity_subtotal_scatter(&report.rows)];
    if !report.ranking.is_empty() {
        page.extra_tables.push(TitledTable {
            title: "Product ranking by quantity sold".to_string(),
            table: TableView::build(&report.ranking, ProductRanking::COLUMNS),
        });
    }

    page.set_table(
        TableView::build(&report.rows, &columns),
        &columns,
        OrderLine::COLUMNS,
        "/order-details/export.csv",
        raw.as_deref(),
    );

    render(&page)
}

/// Quantity against subtotal per order line.
fn quantity_subtotal_scatter(rows: &[OrderLine]) -> ScatterChart {
    ScatterChart::new(
        "Quantity vs subtotal",
        "Quantity",
        "Subtotal (Rp)",
        rows.iter().filter_map(|l| {
            let quantity = l.quantity?;
            let subtotal = l.subtotal?;
            #[allow(clippy::cast_precision_loss)]
            let x = quantity as f64;
            Some((
                l.product_name.clone(),
                x,
                subtotal.to_f64(),
                format!("{quantity} × {}", subtotal.display()),
            ))
        }),
    )
}

/// CSV export of the filtered order lines.
#[instrument(skip(state))]
pub async fn export(
    State(state): State<AppState>,
    Query(query): Query<OrderDetailQuery>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let query = query.with_products(params);
    let columns = select_columns::<OrderLine>(query.columns.as_deref())?;
    let (report, _) = load(&state, &query).await;
    tracing::info!(rows = report.rows.len(), "Exporting order details");
    Ok(csv_response(
        "order_details.csv",
        to_csv(&report.rows, &columns),
    ))
}

impl TableRow for ProductRanking {
    const COLUMNS: &'static [&'static str] = &["product_name", "total_sold", "revenue", "lines"];
    const DEFAULT_COLUMNS: &'static [&'static str] = Self::COLUMNS;

    fn cell(&self, column: &str) -> String {
        match column {
            "product_name" => self.product_name.clone(),
            "total_sold" => self.total_sold.to_string(),
            "revenue" => self.revenue.display(),
            "lines" => self.lines.to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sales_dashboard_core::{CustomerId, Money, OrderDetailId, OrderId, ProductId};

    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_query_collects_repeated_products() {
        let query = OrderDetailQuery {
            quantity_min: Some("2".to_string()),
            subtotal_max: Some("abc".to_string()),
            ..OrderDetailQuery::default()
        }
        .with_products(pairs(&[
            ("products", "Kopi Arabika"),
            ("from", "2024-01-01"),
            ("products", "Teh Hijau"),
            ("products", ""),
        ]));
        let filter = query.filter();
        assert_eq!(filter.products, vec!["Kopi Arabika", "Teh Hijau"]);
        assert_eq!(filter.quantity_min, Some(2));
        assert!(filter.subtotal_max.is_none());
    }

    #[test]
    fn test_product_names_are_kept_verbatim() {
        let query = OrderDetailQuery::default()
            .with_products(pairs(&[("products", "Kopi, Susu"), ("products", " Teh ")]));
        assert_eq!(query.filter().products, vec!["Kopi, Susu", " Teh "]);
    }

    #[test]
    fn test_product_with_comma_can_be_selected() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let line = |id: i32, name: &str| OrderLine {
            id: OrderDetailId::new(id),
            order_id: OrderId::new(1),
            order_date: date,
            customer_id: CustomerId::new(1),
            customer_name: "Budi".to_string(),
            product_id: ProductId::new(id),
            product_name: name.to_string(),
            unit_price: Some(Money::from_units(20_000)),
            quantity: Some(1),
            subtotal: Some(Money::from_units(20_000)),
            order_total: Some(Money::from_units(40_000)),
            phone: None,
        };
        let query =
            OrderDetailQuery::default().with_products(pairs(&[("products", "Kopi, Susu")]));
        let report =
            OrderDetailReport::build(vec![line(1, "Kopi, Susu"), line(2, "Kopi")], query.filter());
        assert_eq!(report.product_options, ["Kopi", "Kopi, Susu"]);
        assert_eq!(report.selected_products, ["Kopi, Susu"]);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].product_name, "Kopi, Susu");

        let chart = quantity_subtotal_scatter(&report.rows);
        assert_eq!(chart.points.len(), 1);
        assert_eq!(chart.points[0].label, "Kopi, Susu");
        assert_eq!(chart.points[0].value, "1 × Rp 20,000");
    }

    #[test]
    fn test_ranking_cells() {
        let ranking = ProductRanking {
            product_name: "Teh Hijau".to_string(),
            total_sold: 7,
            revenue: Money::from_units(105_000),
            lines: 3,
        };
        assert_eq!(ranking.cell("total_sold"), "7");
        assert_eq!(ranking.cell("revenue"), "Rp 105,000");
        assert_eq!(ranking.cell("unknown"), "");
    }
}
