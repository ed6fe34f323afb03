//! `PostgreSQL` implementation of [`SalesStore`].
//!
//! Key columns decode straight into the typed ids. Numeric columns are
//! selected as text and parsed here, so a value the store cannot express
//! as a number becomes a missing value on one row instead of a decode
//! error for the whole fetch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use tracing::instrument;

use sales_dashboard_core::{
    Customer, CustomerId, Money, OrderDetailId, OrderId, OrderLine, OrderSummary, Product,
    ProductId,
};

use super::{ConnectionStatus, DataError, Entity, FailureKind, SalesStore};
use crate::config::{ConnectionTarget, DatabaseConfig};

const CUSTOMERS_SQL: &str = r"
    SELECT customer_id::int4 AS customer_id,
           name::text       AS name,
           email::text      AS email,
           phone::text      AS phone,
           address::text    AS address,
           birthdate::date  AS birthdate
    FROM customers
    ORDER BY name ASC
";

const PRODUCTS_SQL: &str = r"
    SELECT product_id::int4   AS product_id,
           name::text         AS name,
           description::text  AS description,
           price::text        AS price,
           stock::text        AS stock
    FROM products
    ORDER BY name ASC
";

const ORDERS_SQL: &str = r"
    SELECT o.order_id::int4        AS order_id,
           o.order_date::timestamp AS order_date,
           o.total_amount::text    AS total_amount,
           c.name::text            AS customer_name,
           c.phone::text           AS phone
    FROM orders o
    JOIN customers c ON o.customer_id = c.customer_id
    ORDER BY o.order_date DESC
";

const ORDER_DETAILS_SQL: &str = r"
    SELECT od.order_detail_id::int4 AS order_detail_id,
           o.order_id::int4         AS order_id,
           o.order_date::timestamp  AS order_date,
           c.customer_id::int4      AS customer_id,
           c.name::text             AS customer_name,
           p.product_id::int4       AS product_id,
           p.name::text             AS product_name,
           p.price::text            AS unit_price,
           od.quantity::text        AS quantity,
           od.subtotal::text        AS subtotal,
           o.total_amount::text     AS order_total,
           c.phone::text            AS phone
    FROM order_details od
    JOIN orders o    ON od.order_id = o.order_id
    JOIN customers c ON o.customer_id = c.customer_id
    JOIN products p  ON od.product_id = p.product_id
    ORDER BY o.order_date DESC
";

/// Sales store backed by a `PostgreSQL` connection pool.
pub struct PgSalesStore {
    pool: Option<PgPool>,
    status: ConnectionStatus,
    closed: AtomicBool,
}

impl PgSalesStore {
    /// Connect to the configured database, falling back to offline mode.
    ///
    /// Never fails: any error is logged with its [`FailureKind`] and the
    /// returned store reports [`ConnectionStatus::Offline`].
    pub async fn connect(config: &DatabaseConfig) -> Self {
        let target = config.target();
        tracing::info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            target = target.label(),
            "Connecting to sales database"
        );

        match try_connect(config, target).await {
            Ok((pool, server_version)) => {
                tracing::info!(target = target.label(), %server_version, "Database connection established");
                Self {
                    pool: Some(pool),
                    status: ConnectionStatus::Connected {
                        server_version,
                        target,
                    },
                    closed: AtomicBool::new(false),
                }
            }
            Err(e) => {
                log_connect_failure(&e, target);
                Self::offline(e.to_string())
            }
        }
    }

    /// A store that never connected.
    #[must_use]
    pub fn offline(reason: impl Into<String>) -> Self {
        Self {
            pool: None,
            status: ConnectionStatus::Offline {
                reason: reason.into(),
            },
            closed: AtomicBool::new(false),
        }
    }

    fn pool(&self) -> Result<&PgPool, DataError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DataError::Closed);
        }
        match (&self.pool, &self.status) {
            (Some(pool), _) => Ok(pool),
            (None, ConnectionStatus::Offline { reason }) => Err(DataError::Offline {
                reason: reason.clone(),
            }),
            (None, _) => Err(DataError::Offline {
                reason: "no connection".to_string(),
            }),
        }
    }
}

/// Open the pool and verify it with a version query.
async fn try_connect(
    config: &DatabaseConfig,
    target: ConnectionTarget,
) -> Result<(PgPool, String), DataError> {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(config.password.expose_secret())
        .database(&config.database)
        .application_name("sales-dashboard")
        .ssl_mode(ssl_mode(target));

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
        .map_err(connect_error)?;

    let server_version: String = sqlx::query_scalar("SELECT version()")
        .fetch_one(&pool)
        .await
        .map_err(connect_error)?;

    Ok((pool, server_version))
}

/// TLS mode requested for `target`.
const fn ssl_mode(target: ConnectionTarget) -> PgSslMode {
    if target.requires_tls() {
        PgSslMode::Require
    } else {
        PgSslMode::Prefer
    }
}

fn connect_error(error: sqlx::Error) -> DataError {
    DataError::Connect {
        kind: FailureKind::classify(&error),
        detail: error.to_string(),
    }
}

/// Log a failed connect with hints for the operator.
fn log_connect_failure(error: &DataError, target: ConnectionTarget) {
    tracing::warn!(error = %error, target = target.label(), "Failed to connect to the sales database");

    if let DataError::Connect {
        kind: FailureKind::Connection,
        ..
    } = error
    {
        let hints: &[&str] = match target {
            ConnectionTarget::Managed => &[
                "Check DB_HOST, DB_USER, DB_PASSWORD and DB_NAME in the environment or .env",
                "Make sure the managed database project is active",
            ],
            ConnectionTarget::Local => &[
                "Make sure PostgreSQL is running",
                "Check DB_HOST, DB_PORT, DB_USER, DB_PASSWORD and DB_NAME",
                "Make sure the database has been created",
            ],
        };
        for hint in hints {
            tracing::warn!("  hint: {hint}");
        }
    }

    tracing::warn!("Starting in offline mode; no data will be available");
}

/// Log a fetch failure and wrap it.
fn query_failed(entity: Entity, source: sqlx::Error) -> DataError {
    tracing::error!(%entity, error = %source, "Failed to fetch {entity}");
    DataError::Query { entity, source }
}

#[async_trait]
impl SalesStore for PgSalesStore {
    fn status(&self) -> ConnectionStatus {
        if self.closed.load(Ordering::Acquire) {
            ConnectionStatus::Closed
        } else {
            self.status.clone()
        }
    }

    #[instrument(skip(self))]
    async fn fetch_customers(&self) -> Result<Vec<Customer>, DataError> {
        let rows = sqlx::query_as::<_, CustomerRecord>(CUSTOMERS_SQL)
            .fetch_all(self.pool()?)
            .await
            .map_err(|e| query_failed(Entity::Customers, e))?;
        Ok(rows.into_iter().map(Customer::from).collect())
    }

    #[instrument(skip(self))]
    async fn fetch_products(&self) -> Result<Vec<Product>, DataError> {
        let rows = sqlx::query_as::<_, ProductRecord>(PRODUCTS_SQL)
            .fetch_all(self.pool()?)
            .await
            .map_err(|e| query_failed(Entity::Products, e))?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    #[instrument(skip(self))]
    async fn fetch_orders_with_customers(&self) -> Result<Vec<OrderSummary>, DataError> {
        let rows = sqlx::query_as::<_, OrderRecord>(ORDERS_SQL)
            .fetch_all(self.pool()?)
            .await
            .map_err(|e| query_failed(Entity::Orders, e))?;
        Ok(rows.into_iter().map(OrderSummary::from).collect())
    }

    #[instrument(skip(self))]
    async fn fetch_order_details_with_info(&self) -> Result<Vec<OrderLine>, DataError> {
        let rows = sqlx::query_as::<_, OrderLineRecord>(ORDER_DETAILS_SQL)
            .fetch_all(self.pool()?)
            .await
            .map_err(|e| query_failed(Entity::OrderDetails, e))?;
        Ok(rows.into_iter().map(OrderLine::from).collect())
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!("Database store already closed");
            return;
        }
        match &self.pool {
            Some(pool) => {
                pool.close().await;
                tracing::info!("Database connection closed");
            }
            None => tracing::debug!("No database connection to close (offline mode)"),
        }
    }
}

// =============================================================================
// Row Records
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CustomerRecord {
    customer_id: CustomerId,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    birthdate: Option<NaiveDate>,
}

impl From<CustomerRecord> for Customer {
    fn from(r: CustomerRecord) -> Self {
        Self {
            id: r.customer_id,
            name: r.name.unwrap_or_default(),
            email: r.email,
            phone: r.phone,
            address: r.address,
            birthdate: r.birthdate,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRecord {
    product_id: ProductId,
    name: Option<String>,
    description: Option<String>,
    price: Option<String>,
    stock: Option<String>,
}

impl From<ProductRecord> for Product {
    fn from(r: ProductRecord) -> Self {
        Self {
            id: r.product_id,
            name: r.name.unwrap_or_default(),
            description: r.description,
            price: parse_money(r.price.as_deref()),
            stock: parse_count(r.stock.as_deref()),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRecord {
    order_id: OrderId,
    order_date: NaiveDateTime,
    total_amount: Option<String>,
    customer_name: Option<String>,
    phone: Option<String>,
}

impl From<OrderRecord> for OrderSummary {
    fn from(r: OrderRecord) -> Self {
        Self {
            id: r.order_id,
            order_date: r.order_date,
            total_amount: parse_money(r.total_amount.as_deref()),
            customer_name: r.customer_name.unwrap_or_default(),
            phone: r.phone,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRecord {
    order_detail_id: OrderDetailId,
    order_id: OrderId,
    order_date: NaiveDateTime,
    customer_id: CustomerId,
    customer_name: Option<String>,
    product_id: ProductId,
    product_name: Option<String>,
    unit_price: Option<String>,
    quantity: Option<String>,
    subtotal: Option<String>,
    order_total: Option<String>,
    phone: Option<String>,
}

impl From<OrderLineRecord> for OrderLine {
    fn from(r: OrderLineRecord) -> Self {
        Self {
            id: r.order_detail_id,
            order_id: r.order_id,
            order_date: r.order_date,
            customer_id: r.customer_id,
            customer_name: r.customer_name.unwrap_or_default(),
            product_id: r.product_id,
            product_name: r.product_name.unwrap_or_default(),
            unit_price: parse_money(r.unit_price.as_deref()),
            quantity: parse_count(r.quantity.as_deref()),
            subtotal: parse_money(r.subtotal.as_deref()),
            order_total: parse_money(r.order_total.as_deref()),
            phone: r.phone,
        }
    }
}

fn parse_money(raw: Option<&str>) -> Option<Money> {
    raw.and_then(Money::parse_lenient)
}

/// Parse an integer count, accepting integral decimals such as `12.00`.
fn parse_count(raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    let value = raw.parse::<Decimal>().ok()?;
    if value.fract().is_zero() {
        value.to_i64()
    } else {
        None
    }
}
