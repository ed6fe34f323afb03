//! Integration tests for the dashboard pages and health endpoints.
//!
//! Runs the full router in-process over the in-memory store, so no database
//! or running server is needed.

use std::sync::Arc;

use axum::http::StatusCode;
use sales_dashboard::db::{Entity, MemoryStore, SalesStore};
use sales_dashboard_integration_tests::{get, sample_store, sample_tables, test_app};
use serde_json::Value;

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_is_ok_even_offline() {
    let resp = get(test_app(Arc::new(MemoryStore::offline("no database"))), "/health").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, "ok");
}

#[tokio::test]
async fn test_readiness_follows_connection() {
    let resp = get(test_app(sample_store()), "/health/ready").await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = get(
        test_app(Arc::new(MemoryStore::offline("no database"))),
        "/health/ready",
    )
    .await;
    assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_readiness_after_close() {
    let store = sample_store();
    store.close().await;
    let resp = get(test_app(store), "/health/ready").await;
    assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_api_status_json() {
    let resp = get(test_app(sample_store()), "/api/status").await;
    assert_eq!(resp.status, StatusCode::OK);
    let json: Value = serde_json::from_str(&resp.body).expect("JSON body");
    assert_eq!(json["state"], "connected");
    assert_eq!(json["server_version"], "In-memory");
    assert_eq!(json["label"], "Connected (Local PostgreSQL)");

    let resp = get(
        test_app(Arc::new(MemoryStore::offline("DB_HOST not set"))),
        "/api/status",
    )
    .await;
    let json: Value = serde_json::from_str(&resp.body).expect("JSON body");
    assert_eq!(json["state"], "offline");
    assert_eq!(json["server_version"], "Offline Mode");
}

// =============================================================================
// Pages
// =============================================================================

#[tokio::test]
async fn test_home_overview() {
    let resp = get(test_app(sample_store()), "/").await;
    assert_eq!(resp.status, StatusCode::OK);
    // Order 3 has no customer and is excluded from revenue.
    assert!(resp.body.contains("Rp 230,000"));
    assert!(resp.body.contains("Total Customers"));
}

#[tokio::test]
async fn test_every_page_renders() {
    for uri in ["/", "/customers", "/products", "/orders", "/order-details"] {
        let resp = get(test_app(sample_store()), uri).await;
        assert_eq!(resp.status, StatusCode::OK, "GET {uri}");
        assert!(resp.body.contains("Sales Dashboard"), "GET {uri}");
    }
}

#[tokio::test]
async fn test_pages_render_offline() {
    for uri in ["/", "/customers", "/products", "/orders", "/order-details"] {
        let resp = get(test_app(Arc::new(MemoryStore::offline("no database"))), uri).await;
        assert_eq!(resp.status, StatusCode::OK, "GET {uri}");
        assert!(resp.body.contains("Offline Mode"), "GET {uri}");
        assert!(resp.body.contains("Could not load"), "GET {uri}");
    }
}

#[tokio::test]
async fn test_failed_read_shows_notice() {
    let store = MemoryStore::new(sample_tables()).with_failing(Entity::Products);
    let app = test_app(Arc::new(store));

    let resp = get(app.clone(), "/products").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Could not load products"));

    // Other pages are unaffected.
    let resp = get(app, "/customers").await;
    assert!(!resp.body.contains("Could not load"));
    assert!(resp.body.contains("Budi Santoso"));
}

#[tokio::test]
async fn test_customers_column_selection() {
    let resp = get(test_app(sample_store()), "/customers?columns=name,email").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("<th>name</th><th>email</th>"));
    assert!(resp.body.contains("budi@example.com"));
    assert!(!resp.body.contains("<th>address</th>"));
}

#[tokio::test]
async fn test_unknown_column_is_bad_request() {
    let resp = get(test_app(sample_store()), "/orders?columns=order_id,discount").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.body.contains("discount"));
}

#[tokio::test]
async fn test_products_low_stock_warning() {
    let resp = get(test_app(sample_store()), "/products?low_stock=10").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("1 product(s) have low stock (below 10 units)"));
    assert!(resp.body.contains("Low-stock products (1)"));
}

#[tokio::test]
async fn test_scatter_and_box_charts() {
    let app = test_app(sample_store());

    let resp = get(app.clone(), "/products").await;
    assert!(resp.body.contains("Price vs stock"));
    assert!(resp.body.contains("<title>Kopi Arabika: Rp 85,000 · 4 in stock</title>"));
    assert!(resp.body.contains("Price spread"));
    assert!(resp.body.contains("<dt>Median</dt><dd>Rp 57,500</dd>"));

    let resp = get(app.clone(), "/orders").await;
    assert!(resp.body.contains("Orders by date and amount"));
    assert!(resp.body.contains("<title>Siti Rahma: 2024-02-10 · Rp 60,000</title>"));

    let resp = get(app, "/order-details").await;
    assert!(resp.body.contains("Quantity vs subtotal"));
    assert!(resp.body.contains("<title>Teh Hijau: 2 × Rp 60,000</title>"));
}

#[tokio::test]
async fn test_products_without_low_stock() {
    let resp = get(test_app(sample_store()), "/products?low_stock=1").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(!resp.body.contains("have low stock"));
}

#[tokio::test]
async fn test_orders_filter_notice() {
    let resp = get(test_app(sample_store()), "/orders?from=2024-02-01").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Showing 1 of 2 orders matching the selected filters"));
}

#[tokio::test]
async fn test_order_details_product_filter() {
    let resp = get(test_app(sample_store()), "/order-details?products=Teh%20Hijau").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Showing 1 of 2 order lines matching the selected filters"));
    assert!(resp.body.contains("Product ranking by quantity sold"));
    assert!(resp.body.contains(r#"<option value="Teh Hijau" selected>"#));
    assert!(resp.body.contains(r#"<option value="Kopi Arabika">"#));
}
