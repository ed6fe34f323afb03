//! Data access layer for the sales schema.
//!
//! # Tables (read-only)
//!
//! - `customers` - Customer master data
//! - `products` - Product catalogue with price and stock
//! - `orders` - Order headers (`customer_id`, `order_date`, `total_amount`)
//! - `order_details` - Order lines (`order_id`, `product_id`, `quantity`, `subtotal`)
//!
//! # Connection lifecycle
//!
//! ```text
//! Uninitialized -> Connecting -> Connected -> Closed
//!                             \-> Offline
//! ```
//!
//! A failed connect puts the store into offline mode for the rest of the
//! process; nothing reconnects automatically. Every fetch then returns a
//! connection-tier [`DataError`], which the pages turn into an empty view.

pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use sales_dashboard_core::{Customer, OrderLine, OrderSummary, Product};

use crate::config::ConnectionTarget;

pub use memory::{MemoryStore, SalesTables, StoredOrder, StoredOrderDetail};
pub use postgres::PgSalesStore;

/// Status label shown whenever the store is not connected.
pub const OFFLINE_LABEL: &str = "Offline Mode";

/// The four reads the dashboard performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Customers,
    Products,
    Orders,
    OrderDetails,
}

impl Entity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Products => "products",
            Self::Orders => "orders",
            Self::OrderDetails => "order_details",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a connection attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Host unreachable, TLS handshake, authentication, unknown database, timeout.
    Connection,
    /// The server answered with an error unrelated to connecting.
    Database,
    /// Anything else (decode problems, driver bugs).
    Unexpected,
}

impl FailureKind {
    /// Classify a driver error.
    #[must_use]
    pub fn classify(error: &sqlx::Error) -> Self {
        match error {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => Self::Connection,
            sqlx::Error::Database(db_err) => {
                // SQLSTATE classes 08 (connection), 28 (authorization), 3D (unknown catalog)
                let code = db_err.code();
                match code.as_deref().map(|c| c.get(..2).unwrap_or(c)) {
                    Some("08" | "28" | "3D") => Self::Connection,
                    _ => Self::Database,
                }
            }
            _ => Self::Unexpected,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connection => "connection",
            Self::Database => "database",
            Self::Unexpected => "unexpected",
        })
    }
}

/// Errors from the data access layer.
///
/// `Offline`, `Closed` and `Connect` are connection-tier failures and affect
/// every read; `Query` affects only the one read that failed.
#[derive(Debug, Error)]
pub enum DataError {
    /// The store never connected.
    #[error("store is offline: {reason}")]
    Offline { reason: String },

    /// The store was closed by teardown.
    #[error("store connection is closed")]
    Closed,

    /// Connecting failed.
    #[error("{kind} failure while connecting: {detail}")]
    Connect { kind: FailureKind, detail: String },

    /// A single fetch failed on a working connection.
    #[error("failed to fetch {entity}: {source}")]
    Query {
        entity: Entity,
        #[source]
        source: sqlx::Error,
    },
}

impl DataError {
    /// Whether this failure affects the whole store rather than one read.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        !matches!(self, Self::Query { .. })
    }
}

/// Observable state of a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected {
        server_version: String,
        target: ConnectionTarget,
    },
    Offline {
        reason: String,
    },
    Closed,
}

impl ConnectionStatus {
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }

    /// Short machine-readable state name.
    #[must_use]
    pub const fn state(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::Offline { .. } => "offline",
            Self::Closed => "closed",
        }
    }

    /// Human-readable status line.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Connected { target, .. } => format!("Connected ({})", target.label()),
            Self::Offline { .. } => OFFLINE_LABEL.to_string(),
            Self::Closed => "Closed".to_string(),
        }
    }

    /// Server version string, or the offline sentinel.
    #[must_use]
    pub fn server_version(&self) -> &str {
        match self {
            Self::Connected { server_version, .. } => server_version,
            Self::Offline { .. } | Self::Closed => OFFLINE_LABEL,
        }
    }
}

/// Read-only access to the sales schema.
///
/// Implementations log failures where they happen and return them typed;
/// callers pick the fallback (see [`Fetched`]).
#[async_trait]
pub trait SalesStore: Send + Sync + 'static {
    /// Current connection state.
    fn status(&self) -> ConnectionStatus;

    /// All customers, ordered by name ascending.
    async fn fetch_customers(&self) -> Result<Vec<Customer>, DataError>;

    /// All products, ordered by name ascending.
    async fn fetch_products(&self) -> Result<Vec<Product>, DataError>;

    /// Orders inner-joined with their customer, newest first.
    async fn fetch_orders_with_customers(&self) -> Result<Vec<OrderSummary>, DataError>;

    /// Order lines inner-joined with order, customer and product, newest order first.
    async fn fetch_order_details_with_info(&self) -> Result<Vec<OrderLine>, DataError>;

    /// Release the connection. Idempotent and infallible.
    async fn close(&self);
}

/// Rows of one fetch after applying the empty-on-failure fallback.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub rows: Vec<T>,
    /// Set when the rows are empty because the fetch failed.
    pub unavailable: bool,
}

impl<T> Fetched<T> {
    /// Substitute an empty result for a failed fetch.
    pub fn or_empty(entity: Entity, result: Result<Vec<T>, DataError>) -> Self {
        match result {
            Ok(rows) => Self {
                rows,
                unavailable: false,
            },
            Err(e) => {
                // Offline stores already warned once at startup
                if e.is_connection() {
                    tracing::debug!(%entity, error = %e, "Showing empty {entity}: store unavailable");
                } else {
                    tracing::warn!(%entity, error = %e, "Showing empty {entity}: data unavailable");
                }
                Self {
                    rows: Vec::new(),
                    unavailable: true,
                }
            }
        }
    }
}
