//! Products page and export.

use axum::{
    extract::{Query, RawQuery, State},
    response::{Html, Response},
};
use serde::Deserialize;
use tracing::instrument;

use sales_dashboard_core::View;

use super::{
    FilterField, Metric, ReportTemplate, TitledTable, csv_response, money_or_dash, render,
};
use crate::analytics::products::ProductFilter;
use crate::analytics::{ProductReport, ProductRow, filter_notice, parse_i64, parse_money};
use crate::charts::{BarChart, BoxChart, ScatterChart, ShareChart};
use crate::db::{Entity, Fetched};
use crate::error::AppError;
use crate::export::{TableRow, TableView, select_columns, to_csv};
use crate::state::AppState;

/// Query parameters for the products page.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub stock_min: Option<String>,
    pub stock_max: Option<String>,
    /// Low-stock threshold.
    pub low_stock: Option<String>,
    pub columns: Option<String>,
}

impl ProductQuery {
    fn filter(&self) -> ProductFilter {
        ProductFilter {
            price_min: parse_money(self.price_min.as_deref()),
            price_max: parse_money(self.price_max.as_deref()),
            stock_min: parse_i64(self.stock_min.as_deref()),
            stock_max: parse_i64(self.stock_max.as_deref()),
            low_stock: parse_i64(self.low_stock.as_deref()),
        }
    }
}

async fn load(state: &AppState, query: &ProductQuery) -> (ProductReport, bool) {
    let fetched = Fetched::or_empty(Entity::Products, state.store().fetch_products().await);
    let report = ProductReport::build(
        fetched.rows,
        query.filter(),
        state.config().low_stock_threshold,
    );
    (report, fetched.unavailable)
}

/// Price against stock, one point per product with both values.
fn price_stock_scatter(rows: &[ProductRow]) -> ScatterChart {
    ScatterChart::new(
        "Price vs stock",
        "Price (Rp)",
        "Stock",
        rows.iter().filter_map(|r| {
            let price = r.product.price?;
            let stock = r.product.stock?;
            #[allow(clippy::cast_precision_loss)]
            let y = stock as f64;
            Some((
                r.product.name.clone(),
                price.to_f64(),
                y,
                format!("{} · {stock} in stock", price.display()),
            ))
        }),
    )
}

/// Columns shown in the page table: the stock status follows the stock column.
fn display_columns(columns: &[&'static str]) -> Vec<&'static str> {
    let mut shown = columns.to_vec();
    if shown.contains(&"stock") && !shown.contains(&"stock_status") {
        shown.push("stock_status");
    }
    shown
}

/// Products page handler.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
    RawQuery(raw): RawQuery,
) -> Result<Html<String>, AppError> {
    let columns = select_columns::<ProductRow>(query.columns.as_deref())?;
    let (report, unavailable) = load(&state, &query).await;
    let threshold = report.threshold;
    let low_count = report.low_stock_count();

    let mut page = ReportTemplate::new(&state, View::Products);
    page.mark_unavailable(Entity::Products, unavailable);
    page.metrics = vec![
        Metric::new("📦 Total Products", report.rows.len()),
        Metric::new("💰 Average Price", money_or_dash(report.average_price)),
        Metric::new("📊 Total Stock", report.total_stock),
        Metric::new("💵 Inventory Value", report.inventory_value.display()),
        Metric::new("⚠️ Low Stock", low_count).with_note(format!("< {threshold} units")),
    ];

    let price = report.price_range;
    let stock = report.stock_range;
    let mut price_min = FilterField::number(
        "price_min",
        "Minimum price (Rp)",
        price.and_then(|r| r.min).map(|m| m.amount()),
    );
    let mut price_max = FilterField::number(
        "price_max",
        "Maximum price (Rp)",
        price.and_then(|r| r.max).map(|m| m.amount()),
    );
    if let Some(b) = report.price_bounds {
        price_min = price_min.within(b.min.amount(), b.max.amount());
        price_max = price_max.within(b.min.amount(), b.max.amount());
    }
    let mut stock_min =
        FilterField::number("stock_min", "Minimum stock", stock.and_then(|r| r.min));
    let mut stock_max =
        FilterField::number("stock_max", "Maximum stock", stock.and_then(|r| r.max));
    if let Some(b) = report.stock_bounds {
        stock_min = stock_min.within(b.min, b.max);
        stock_max = stock_max.within(b.min, b.max);
    }
    page.filters = vec![
        price_min,
        price_max,
        stock_min,
        stock_max,
        FilterField::number("low_stock", "Low-stock threshold", Some(threshold))
            .hint("Products with stock below this value count as low stock"),
        FilterField::text("columns", "Columns", columns.join(","))
            .hint(format!("Available: {}", ProductRow::COLUMNS.join(", "))),
    ];

    if low_count > 0 {
        page.warnings.push(format!(
            "{low_count} product(s) have low stock (below {threshold} units)"
        ));
        let low_rows: Vec<LowStockRow<'_>> = report.low_stock.iter().map(LowStockRow).collect();
        page.extra_tables.push(TitledTable {
            title: format!("Low-stock products ({low_count})"),
            table: TableView::build(&low_rows, LowStockRow::COLUMNS),
        });
    }
    page.notices.extend(filter_notice(report.rows.len(), report.total, "products"));

    page.bar_charts = vec![
        BarChart::money("Top 10 products by price", &report.top_by_price),
        BarChart::new(
            "Price distribution",
            report.price_histogram.iter().map(|bin| {
                let count = f64::from(u32::try_from(bin.count).unwrap_or(u32::MAX));
                (
                    format!("{} – {}", bin.lower.display(), bin.upper.display()),
                    count,
                    bin.count.to_string(),
                )
            }),
        ),
        BarChart::count("10 products with the lowest stock", &report.lowest_stock),
        BarChart::count(
            format!("Low-stock products (< {threshold} units)"),
            &report.low_stock_series(),
        ),
    ];
    page.share_charts = vec![ShareChart::new("Stock distribution", &report.stock_share)];
    page.scatter_charts = vec![price_stock_scatter(&report.rows)];
    page.box_charts = vec![BoxChart::money(
        "Price spread",
        report.price_summary.as_ref(),
    )];

    let shown = display_columns(&columns);
    page.set_table(
        TableView::build(&report.rows, &shown),
        &columns,
        ProductRow::COLUMNS,
        "/products/export.csv",
        raw.as_deref(),
    );

    render(&page)
}

/// CSV export of the filtered products.
#[instrument(skip(state))]
pub async fn export(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Response, AppError> {
    let columns = select_columns::<ProductRow>(query.columns.as_deref())?;
    let (report, _) = load(&state, &query).await;
    tracing::info!(rows = report.rows.len(), "Exporting products");
    Ok(csv_response("products.csv", to_csv(&report.rows, &columns)))
}

/// Low-stock detail line with its inventory value.
struct LowStockRow<'a>(&'a ProductRow);

impl TableRow for LowStockRow<'_> {
    const COLUMNS: &'static [&'static str] =
        &["product_id", "name", "stock", "price", "inventory_value"];
    const DEFAULT_COLUMNS: &'static [&'static str] = Self::COLUMNS;

    fn cell(&self, column: &str) -> String {
        match column {
            "inventory_value" => self
                .0
                .inventory_value()
                .map(|m| m.display())
                .unwrap_or_default(),
            other => self.0.cell(other),
        }
    }
}
