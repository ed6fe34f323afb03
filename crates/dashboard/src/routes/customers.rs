//! Customers page and export.

use axum::{
    extract::{Query, RawQuery, State},
    response::{Html, Response},
};
use serde::Deserialize;
use tracing::instrument;

use sales_dashboard_core::View;

use super::{FilterField, Metric, ReportTemplate, csv_response, render};
use crate::analytics::customers::CustomerFilter;
use crate::analytics::{CustomerReport, CustomerRow, parse_i64};
use crate::db::{Entity, Fetched};
use crate::error::AppError;
use crate::export::{TableRow, TableView, select_columns, to_csv};
use crate::state::AppState;

/// Query parameters for the customers page.
#[derive(Debug, Default, Deserialize)]
pub struct CustomerQuery {
    pub age_min: Option<String>,
    pub age_max: Option<String>,
    /// Comma-separated column names.
    pub columns: Option<String>,
}

impl CustomerQuery {
    fn filter(&self) -> CustomerFilter {
        CustomerFilter {
            age_min: parse_i64(self.age_min.as_deref()),
            age_max: parse_i64(self.age_max.as_deref()),
        }
    }
}

async fn load(state: &AppState, query: &CustomerQuery) -> (CustomerReport, bool) {
    let fetched = Fetched::or_empty(Entity::Customers, state.store().fetch_customers().await);
    let today = chrono::Local::now().date_naive();
    let report = CustomerReport::build(fetched.rows, today, state.config().age_rule, query.filter());
    (report, fetched.unavailable)
}

/// Customers page handler.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CustomerQuery>,
    RawQuery(raw): RawQuery,
) -> Result<Html<String>, AppError> {
    let columns = select_columns::<CustomerRow>(query.columns.as_deref())?;
    let (report, unavailable) = load(&state, &query).await;

    let mut page = ReportTemplate::new(&state, View::Customers);
    page.mark_unavailable(Entity::Customers, unavailable);
    page.metrics = vec![Metric::new("👥 Total Customers", report.total).with_note("All data")];

    let range = report.age_range;
    let mut age_min = FilterField::number("age_min", "Minimum age", range.and_then(|r| r.min));
    let mut age_max = FilterField::number("age_max", "Maximum age", range.and_then(|r| r.max));
    if let Some(bounds) = report.age_bounds {
        age_min = age_min.within(bounds.min, bounds.max);
        age_max = age_max.within(bounds.min, bounds.max);
    }
    page.filters = vec![
        age_min,
        age_max,
        FilterField::text("columns", "Columns", columns.join(","))
            .hint(format!("Available: {}", CustomerRow::COLUMNS.join(", "))),
    ];

    page.notices.extend(crate::analytics::filter_notice(
        report.rows.len(),
        report.total,
        "customers",
    ));
    page.set_table(
        TableView::build(&report.rows, &columns),
        &columns,
        CustomerRow::COLUMNS,
        "/customers/export.csv",
        raw.as_deref(),
    );

    render(&page)
}

/// CSV export of the filtered customers.
#[instrument(skip(state))]
pub async fn export(
    State(state): State<AppState>,
    Query(query): Query<CustomerQuery>,
) -> Result<Response, AppError> {
    let columns = select_columns::<CustomerRow>(query.columns.as_deref())?;
    let (report, _) = load(&state, &query).await;
    tracing::info!(rows = report.rows.len(), "Exporting customers");
    Ok(csv_response("customers.csv", to_csv(&report.rows, &columns)))
}
