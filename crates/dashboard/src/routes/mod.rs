//! HTTP route handlers for the dashboard.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                    - Liveness check
//! GET  /health/ready              - 200 only while the store is connected
//! GET  /api/status                - Connection status as JSON
//!
//! GET  /                          - Home: headline counts and revenue
//! GET  /customers                 - Customers with age filter
//! GET  /customers/export.csv      - CSV of the filtered customers
//! GET  /products                  - Products with price/stock filters
//! GET  /products/export.csv       - CSV of the filtered products
//! GET  /orders                    - Orders with date/amount filters
//! GET  /orders/export.csv         - CSV of the filtered orders
//! GET  /order-details             - Order lines with product/date/quantity filters
//! GET  /order-details/export.csv  - CSV of the filtered order lines
//! GET  <anything else>            - Redirect to the closest page
//! ```
//!
//! Every page reads fresh data from the store on each request. A failed
//! read renders the page empty with a notice instead of an error page.

pub mod customers;
pub mod home;
pub mod order_details;
pub mod orders;
pub mod products;
pub mod status;

use askama::Template;
use axum::{
    Router,
    http::{StatusCode, Uri, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};

use sales_dashboard_core::{Money, View};

use crate::charts::{BarChart, BoxChart, LineChart, ScatterChart, ShareChart};
use crate::db::Entity;
use crate::error::AppError;
use crate::export::TableView;
use crate::state::AppState;

/// Build the dashboard router.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health
        .route("/health", get(status::health))
        .route("/health/ready", get(status::readiness))
        .route("/api/status", get(status::api_status))
        // Pages
        .route(View::Home.path(), get(home::index))
        .route(View::Customers.path(), get(customers::index))
        .route("/customers/export.csv", get(customers::export))
        .route(View::Products.path(), get(products::index))
        .route("/products/export.csv", get(products::export))
        .route(View::Orders.path(), get(orders::index))
        .route("/orders/export.csv", get(orders::export))
        .route(View::OrderDetails.path(), get(order_details::index))
        .route("/order-details/export.csv", get(order_details::export))
        .fallback(fallback)
}

/// Unknown paths land on the page they fall under, or home.
async fn fallback(uri: Uri) -> Redirect {
    let view = View::from_path(uri.path());
    tracing::debug!(path = uri.path(), to = view.path(), "Redirecting unknown path");
    Redirect::to(view.path())
}

// =============================================================================
// Page Chrome
// =============================================================================

/// Sidebar entry.
#[derive(Debug, Clone)]
pub struct NavItem {
    pub path: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub active: bool,
}

/// Title, navigation and connection status shared by every page.
#[derive(Debug, Clone)]
pub struct Chrome {
    pub title: &'static str,
    pub icon: &'static str,
    pub nav: Vec<NavItem>,
    pub status_label: String,
    pub server_version: String,
    pub connected: bool,
}

impl Chrome {
    #[must_use]
    pub fn new(state: &AppState, view: View) -> Self {
        let status = state.store().status();
        Self {
            title: view.label(),
            icon: view.icon(),
            nav: View::ALL
                .into_iter()
                .map(|v| NavItem {
                    path: v.path(),
                    label: v.label(),
                    icon: v.icon(),
                    active: v == view,
                })
                .collect(),
            status_label: status.label(),
            server_version: status.server_version().to_string(),
            connected: status.is_connected(),
        }
    }
}

// =============================================================================
// Report Page
// =============================================================================

/// Headline number.
#[derive(Debug, Clone)]
pub struct Metric {
    pub label: &'static str,
    pub value: String,
    pub note: Option<String>,
}

impl Metric {
    pub fn new(label: &'static str, value: impl ToString) -> Self {
        Self {
            label,
            value: value.to_string(),
            note: None,
        }
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Choice in a multi-select field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub value: String,
    pub selected: bool,
}

/// One input of the filter form.
#[derive(Debug, Clone)]
pub struct FilterField {
    pub name: &'static str,
    pub label: &'static str,
    /// HTML input type, or `select` for a multi-select.
    pub kind: &'static str,
    pub value: String,
    pub min: String,
    pub max: String,
    pub hint: Option<String>,
    pub options: Vec<FilterOption>,
}

impl FilterField {
    pub fn number(name: &'static str, label: &'static str, value: Option<impl ToString>) -> Self {
        Self {
            name,
            label,
            kind: "number",
            value: value.map(|v| v.to_string()).unwrap_or_default(),
            min: String::new(),
            max: String::new(),
            hint: None,
            options: Vec::new(),
        }
    }

    pub fn date(name: &'static str, label: &'static str, value: Option<impl ToString>) -> Self {
        Self {
            kind: "date",
            ..Self::number(name, label, value)
        }
    }

    pub fn text(name: &'static str, label: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind: "text",
            value: value.into(),
            ..Self::number(name, label, None::<String>)
        }
    }

    /// Multi-select submitting one `name=value` pair per chosen option.
    pub fn multi_select(
        name: &'static str,
        label: &'static str,
        options: &[String],
        selected: &[String],
    ) -> Self {
        Self {
            kind: "select",
            options: options
                .iter()
                .map(|value| FilterOption {
                    value: value.clone(),
                    selected: selected.contains(value),
                })
                .collect(),
            ..Self::number(name, label, None::<String>)
        }
    }

    #[must_use]
    pub fn is_select(&self) -> bool {
        self.kind == "select"
    }

    /// Input domain shown next to the field.
    #[must_use]
    pub fn within(mut self, min: impl ToString, max: impl ToString) -> Self {
        self.min = min.to_string();
        self.max = max.to_string();
        self
    }

    #[must_use]
    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// A secondary table with its heading.
#[derive(Debug, Clone)]
pub struct TitledTable {
    pub title: String,
    pub table: TableView,
}

/// Shared layout of the customers, products, orders and order details pages.
#[derive(Template)]
#[template(path = "report.html")]
pub struct ReportTemplate {
    pub chrome: Chrome,
    /// Entities whose read failed.
    pub unavailable: Vec<&'static str>,
    pub warnings: Vec<String>,
    pub notices: Vec<String>,
    pub metrics: Vec<Metric>,
    pub form_action: &'static str,
    pub filters: Vec<FilterField>,
    pub bar_charts: Vec<BarChart>,
    pub share_charts: Vec<ShareChart>,
    pub line_charts: Vec<LineChart>,
    pub scatter_charts: Vec<ScatterChart>,
    pub box_charts: Vec<BoxChart>,
    pub extra_tables: Vec<TitledTable>,
    pub table: TableView,
    pub columns: String,
    pub available_columns: String,
    pub export_href: String,
}

impl ReportTemplate {
    /// Empty report for `view` with the page chrome filled in.
    #[must_use]
    pub fn new(state: &AppState, view: View) -> Self {
        Self {
            chrome: Chrome::new(state, view),
            unavailable: Vec::new(),
            warnings: Vec::new(),
            notices: Vec::new(),
            metrics: Vec::new(),
            form_action: view.path(),
            filters: Vec::new(),
            bar_charts: Vec::new(),
            share_charts: Vec::new(),
            line_charts: Vec::new(),
            scatter_charts: Vec::new(),
            box_charts: Vec::new(),
            extra_tables: Vec::new(),
            table: TableView::default(),
            columns: String::new(),
            available_columns: String::new(),
            export_href: String::new(),
        }
    }

    /// Record a failed read.
    pub fn mark_unavailable(&mut self, entity: Entity, unavailable: bool) {
        if unavailable {
            self.unavailable.push(entity.as_str());
        }
    }

    /// Fill the table section.
    pub fn set_table(
        &mut self,
        table: TableView,
        columns: &[&str],
        available: &[&str],
        export_path: &str,
        query: Option<&str>,
    ) {
        self.table = table;
        self.columns = columns.join(",");
        self.available_columns = available.join(", ");
        self.export_href = match query {
            Some(q) if !q.is_empty() => format!("{export_path}?{q}"),
            _ => export_path.to_string(),
        };
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Render a template to HTML.
///
/// # Errors
///
/// Returns `AppError::Template` if rendering fails.
pub fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    Ok(Html(template.render()?))
}

/// CSV download response.
#[must_use]
pub fn csv_response(filename: &str, body: String) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

/// Placeholder for a metric that has no value.
pub const NO_VALUE: &str = "–";

/// Rupiah display, or the placeholder.
#[must_use]
pub fn money_or_dash(value: Option<Money>) -> String {
    value.map_or_else(|| NO_VALUE.to_string(), |m| m.display())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::DashboardConfig;
    use crate::db::{MemoryStore, SalesTables};

    fn state() -> AppState {
        AppState::new(
            DashboardConfig::default(),
            Arc::new(MemoryStore::new(SalesTables::default())),
        )
    }

    #[test]
    fn test_exactly_one_nav_item_active() {
        let chrome = Chrome::new(&state(), View::Orders);
        let active: Vec<_> = chrome.nav.iter().filter(|n| n.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].path, "/orders");
        assert_eq!(chrome.title, "Orders");
    }

    #[test]
    fn test_chrome_reports_offline() {
        let state = AppState::new(
            DashboardConfig::default(),
            Arc::new(MemoryStore::offline("DB_HOST not set")),
        );
        let chrome = Chrome::new(&state, View::Home);
        assert!(!chrome.connected);
        assert_eq!(chrome.server_version, crate::db::OFFLINE_LABEL);
    }

    #[test]
    fn test_export_href_keeps_query() {
        let mut page = ReportTemplate::new(&state(), View::Customers);
        page.set_table(
            TableView::default(),
            &["name", "age"],
            &["name", "age", "email"],
            "/customers/export.csv",
            Some("age_min=20&columns=name,age"),
        );
        assert_eq!(page.columns, "name,age");
        assert_eq!(
            page.export_href,
            "/customers/export.csv?age_min=20&columns=name,age"
        );
    }

    #[test]
    fn test_multi_select_marks_chosen_options() {
        let options = vec!["Kopi".to_string(), "Kopi, Susu".to_string()];
        let field =
            FilterField::multi_select("products", "Products", &options, &options[1..]);
        assert!(field.is_select());
        assert_eq!(
            field.options,
            vec![
                FilterOption {
                    value: "Kopi".to_string(),
                    selected: false,
                },
                FilterOption {
                    value: "Kopi, Susu".to_string(),
                    selected: true,
                },
            ]
        );
        assert!(!FilterField::text("columns", "Columns", "").is_select());
    }

    #[test]
    fn test_money_or_dash() {
        assert_eq!(money_or_dash(None), NO_VALUE);
        assert_eq!(money_or_dash(Some(Money::from_units(1_000))), "Rp 1,000");
    }

    #[tokio::test]
    async fn test_fallback_redirects_to_view() {
        let response = fallback(Uri::from_static("/orders/")).await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/orders");

        let response = fallback(Uri::from_static("/nope")).await.into_response();
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[test]
    fn test_csv_response_headers() {
        let response = csv_response("orders.csv", "a\n".to_string());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"orders.csv\""
        );
    }
}
