//! In-memory [`SalesStore`] holding raw tables.
//!
//! Applies the same inner joins and orderings as the SQL queries so pages
//! and exports can be exercised without a database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDateTime;

use sales_dashboard_core::{
    Customer, CustomerId, Money, OrderDetailId, OrderId, OrderLine, OrderSummary, Product,
    ProductId,
};

use super::{ConnectionStatus, DataError, Entity, SalesStore};
use crate::config::ConnectionTarget;

/// Server version reported by a connected in-memory store.
pub const MEMORY_SERVER_VERSION: &str = "In-memory";

/// Row of the `orders` table.
#[derive(Debug, Clone)]
pub struct StoredOrder {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub order_date: NaiveDateTime,
    pub total_amount: Option<Money>,
}

/// Row of the `order_details` table.
#[derive(Debug, Clone)]
pub struct StoredOrderDetail {
    pub id: OrderDetailId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: Option<i64>,
    pub subtotal: Option<Money>,
}

/// The four sales tables.
#[derive(Debug, Clone, Default)]
pub struct SalesTables {
    pub customers: Vec<Customer>,
    pub products: Vec<Product>,
    pub orders: Vec<StoredOrder>,
    pub order_details: Vec<StoredOrderDetail>,
}

/// Sales store over [`SalesTables`].
pub struct MemoryStore {
    tables: SalesTables,
    offline_reason: Option<String>,
    failing: Option<Entity>,
    closed: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub const fn new(tables: SalesTables) -> Self {
        Self {
            tables,
            offline_reason: None,
            failing: None,
            closed: AtomicBool::new(false),
        }
    }

    /// A store that behaves like a failed connect.
    #[must_use]
    pub fn offline(reason: impl Into<String>) -> Self {
        Self {
            tables: SalesTables::default(),
            offline_reason: Some(reason.into()),
            failing: None,
            closed: AtomicBool::new(false),
        }
    }

    /// Make every fetch of `entity` fail with a query error.
    #[must_use]
    pub const fn with_failing(mut self, entity: Entity) -> Self {
        self.failing = Some(entity);
        self
    }

    fn check(&self, entity: Entity) -> Result<(), DataError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DataError::Closed);
        }
        if let Some(reason) = &self.offline_reason {
            return Err(DataError::Offline {
                reason: reason.clone(),
            });
        }
        if self.failing == Some(entity) {
            let source = sqlx::Error::Protocol(format!("simulated failure reading {entity}"));
            tracing::error!(%entity, error = %source, "Failed to fetch {entity}");
            return Err(DataError::Query { entity, source });
        }
        Ok(())
    }
}

/// Case-insensitive name order, ties broken by the exact name.
///
/// `PostgreSQL` sorts by the database collation, which for the usual
/// `en_US.UTF-8` setup also ignores case first. Accents and punctuation may
/// still order differently there.
fn name_order(name: &str) -> (String, String) {
    (name.to_lowercase(), name.to_string())
}

#[async_trait]
impl SalesStore for MemoryStore {
    fn status(&self) -> ConnectionStatus {
        if self.closed.load(Ordering::Acquire) {
            return ConnectionStatus::Closed;
        }
        match &self.offline_reason {
            Some(reason) => ConnectionStatus::Offline {
                reason: reason.clone(),
            },
            None => ConnectionStatus::Connected {
                server_version: MEMORY_SERVER_VERSION.to_string(),
                target: ConnectionTarget::Local,
            },
        }
    }

    async fn fetch_customers(&self) -> Result<Vec<Customer>, DataError> {
        self.check(Entity::Customers)?;
        let mut rows = self.tables.customers.clone();
        rows.sort_by_cached_key(|r| name_order(&r.name));
        Ok(rows)
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, DataError> {
        self.check(Entity::Products)?;
        let mut rows = self.tables.products.clone();
        rows.sort_by_cached_key(|r| name_order(&r.name));
        Ok(rows)
    }

    async fn fetch_orders_with_customers(&self) -> Result<Vec<OrderSummary>, DataError> {
        self.check(Entity::Orders)?;
        let customers = self.customer_index();
        let mut rows: Vec<OrderSummary> = self
            .tables
            .orders
            .iter()
            .filter_map(|order| {
                let customer = customers.get(&order.customer_id)?;
                Some(OrderSummary {
                    id: order.id,
                    order_date: order.order_date,
                    total_amount: order.total_amount,
                    customer_name: customer.name.clone(),
                    phone: customer.phone.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        Ok(rows)
    }

    async fn fetch_order_details_with_info(&self) -> Result<Vec<OrderLine>, DataError> {
        self.check(Entity::OrderDetails)?;
        let customers = self.customer_index();
        let products: HashMap<ProductId, &Product> =
            self.tables.products.iter().map(|p| (p.id, p)).collect();
        let orders: HashMap<OrderId, &StoredOrder> =
            self.tables.orders.iter().map(|o| (o.id, o)).collect();

        let mut rows: Vec<OrderLine> = self
            .tables
            .order_details
            .iter()
            .filter_map(|detail| {
                let order = orders.get(&detail.order_id)?;
                let customer = customers.get(&order.customer_id)?;
                let product = products.get(&detail.product_id)?;
                Some(OrderLine {
                    id: detail.id,
                    order_id: order.id,
                    order_date: order.order_date,
                    customer_id: customer.id,
                    customer_name: customer.name.clone(),
                    product_id: product.id,
                    product_name: product.name.clone(),
                    unit_price: product.price,
                    quantity: detail.quantity,
                    subtotal: detail.subtotal,
                    order_total: order.total_amount,
                    phone: customer.phone.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        Ok(rows)
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!("In-memory store already closed");
        } else {
            tracing::info!("In-memory store closed");
        }
    }
}

impl MemoryStore {
    fn customer_index(&self) -> HashMap<CustomerId, &Customer> {
        self.tables.customers.iter().map(|c| (c.id, c)).collect()
    }
}
