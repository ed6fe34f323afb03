//! Home page: headline counts and total revenue.

use askama::Template;
use axum::{extract::State, response::Html};
use tracing::instrument;

use sales_dashboard_core::View;

use super::{Chrome, render};
use crate::analytics::Overview;
use crate::db::{Entity, Fetched};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub chrome: Chrome,
    pub unavailable: Vec<&'static str>,
    pub overview: Overview,
    pub revenue: String,
}

/// Read every table the overview needs, substituting empty results for failures.
pub async fn overview(state: &AppState) -> (Overview, Vec<&'static str>) {
    let store = state.store();
    let customers = Fetched::or_empty(Entity::Customers, store.fetch_customers().await);
    let products = Fetched::or_empty(Entity::Products, store.fetch_products().await);
    let orders = Fetched::or_empty(Entity::Orders, store.fetch_orders_with_customers().await);

    let unavailable = [
        (Entity::Customers, customers.unavailable),
        (Entity::Products, products.unavailable),
        (Entity::Orders, orders.unavailable),
    ]
    .into_iter()
    .filter_map(|(entity, failed)| failed.then_some(entity.as_str()))
    .collect();

    let overview = Overview::build(customers.rows.len(), products.rows.len(), &orders.rows);
    (overview, unavailable)
}

/// Home page handler.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let (overview, unavailable) = overview(&state).await;
    let template = HomeTemplate {
        chrome: Chrome::new(&state, View::Home),
        unavailable,
        revenue: overview.revenue.display(),
        overview,
    };
    render(&template)
}
