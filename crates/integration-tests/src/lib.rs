//! Integration tests for the sales dashboard.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process router tests over the in-memory store
//! cargo test -p sales-dashboard-integration-tests
//!
//! # Include the live database tests (needs DB_HOST, DB_USER, DB_PASSWORD, DB_NAME)
//! cargo test -p sales-dashboard-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `pages` - Every page renders, with data, offline, and with a failing read
//! - `exports` - CSV downloads honor filters and column selection
//! - `live_database` - Read-only checks against a real sales database

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use chrono::{NaiveDate, NaiveDateTime};
use tower::ServiceExt;

use sales_dashboard::app;
use sales_dashboard::config::DashboardConfig;
use sales_dashboard::db::{MemoryStore, SalesStore, SalesTables, StoredOrder, StoredOrderDetail};
use sales_dashboard::state::AppState;
use sales_dashboard_core::{
    Customer, CustomerId, Money, OrderDetailId, OrderId, Product, ProductId,
};

/// Response parts collected by [`get`].
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

/// Router over `store` with default configuration.
pub fn test_app(store: Arc<dyn SalesStore>) -> Router {
    app(AppState::new(DashboardConfig::default(), store))
}

/// Issue a GET against the router and read the whole body.
///
/// # Panics
///
/// Panics if the request cannot be built or the body is not UTF-8.
pub async fn get(app: Router, uri: &str) -> TestResponse {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("valid request");
    let response = match app.oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    TestResponse {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).expect("UTF-8 body"),
    }
}

fn at(date: &str) -> NaiveDateTime {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .expect("fixture date")
        .and_hms_opt(10, 30, 0)
        .expect("fixture time")
}

/// Small sales schema used across the tests.
///
/// - Three customers; Andi has no birthdate.
/// - Two products; Kopi Arabika is low on stock.
/// - Three orders; order 3 belongs to a deleted customer and drops out of
///   every join.
#[must_use]
pub fn sample_tables() -> SalesTables {
    SalesTables {
        customers: vec![
            Customer {
                id: CustomerId::new(1),
                name: "Budi Santoso".to_string(),
                email: Some("budi@example.com".to_string()),
                phone: Some("0812-1111".to_string()),
                address: Some("Jl. Merdeka 1, Bandung".to_string()),
                birthdate: NaiveDate::from_ymd_opt(1980, 5, 1),
            },
            Customer {
                id: CustomerId::new(2),
                name: "Siti Rahma".to_string(),
                email: Some("siti@example.com".to_string()),
                phone: None,
                address: None,
                birthdate: NaiveDate::from_ymd_opt(2004, 1, 15),
            },
            Customer {
                id: CustomerId::new(3),
                name: "Andi Wijaya".to_string(),
                email: None,
                phone: None,
                address: None,
                birthdate: None,
            },
        ],
        products: vec![
            Product {
                id: ProductId::new(1),
                name: "Kopi Arabika".to_string(),
                description: Some("250 g, biji".to_string()),
                price: Some(Money::from_units(85_000)),
                stock: Some(4),
            },
            Product {
                id: ProductId::new(2),
                name: "Teh Hijau".to_string(),
                description: None,
                price: Some(Money::from_units(30_000)),
                stock: Some(50),
            },
        ],
        orders: vec![
            StoredOrder {
                id: OrderId::new(1),
                customer_id: CustomerId::new(1),
                order_date: at("2024-01-05"),
                total_amount: Some(Money::from_units(170_000)),
            },
            StoredOrder {
                id: OrderId::new(2),
                customer_id: CustomerId::new(2),
                order_date: at("2024-02-10"),
                total_amount: Some(Money::from_units(60_000)),
            },
            StoredOrder {
                id: OrderId::new(3),
                customer_id: CustomerId::new(99),
                order_date: at("2024-02-11"),
                total_amount: Some(Money::from_units(99_000)),
            },
        ],
        order_details: vec![
            StoredOrderDetail {
                id: OrderDetailId::new(1),
                order_id: OrderId::new(1),
                product_id: ProductId::new(1),
                quantity: Some(2),
                subtotal: Some(Money::from_units(170_000)),
            },
            StoredOrderDetail {
                id: OrderDetailId::new(2),
                order_id: OrderId::new(2),
                product_id: ProductId::new(2),
                quantity: Some(2),
                subtotal: Some(Money::from_units(60_000)),
            },
            StoredOrderDetail {
                id: OrderDetailId::new(3),
                order_id: OrderId::new(3),
                product_id: ProductId::new(1),
                quantity: Some(1),
                subtotal: Some(Money::from_units(85_000)),
            },
        ],
    }
}

/// Connected in-memory store over [`sample_tables`].
#[must_use]
pub fn sample_store() -> Arc<dyn SalesStore> {
    Arc::new(MemoryStore::new(sample_tables()))
}
