//! CSV export command.
//!
//! # Usage
//!
//! ```bash
//! sd-cli export customers
//! sd-cli export order-details --columns order_id,product_name,quantity -o lines.csv
//! ```
//!
//! Exports are unfiltered: every row the store returns, with the same column
//! names and encoding as the dashboard's download buttons.

use std::path::Path;

use clap::ValueEnum;
use sales_dashboard::analytics::{CustomerRow, ProductRow, StockStatus};
use sales_dashboard::config::{ConfigError, DashboardConfig};
use sales_dashboard::db::{DataError, SalesStore};
use sales_dashboard::export::{ExportError as ColumnError, TableRow, select_columns, to_csv};
use sales_dashboard_core::{OrderLine, OrderSummary};
use thiserror::Error;

/// Tables available for export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Table {
    Customers,
    Products,
    Orders,
    OrderDetails,
}

/// Errors from the export command.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Invalid columns: {0}")]
    Columns(#[from] ColumnError),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Export one table to a file or stdout.
///
/// # Errors
///
/// Returns `ExportError` if the store is offline, the read fails, a column
/// is unknown, or the output cannot be written.
#[allow(clippy::print_stdout)]
pub async fn run(
    table: Table,
    columns: Option<&str>,
    output: Option<&Path>,
) -> Result<(), ExportError> {
    let config = DashboardConfig::from_env()?;
    let store = super::open_store().await;
    let result = render(&store, &config, table, columns).await;
    store.close().await;
    let (csv, rows) = result?;

    match output {
        Some(path) => {
            std::fs::write(path, csv)?;
            tracing::info!(rows, path = %path.display(), "Export written");
        }
        None => print!("{csv}"),
    }
    Ok(())
}

/// CSV text and row count for one table.
///
/// # Errors
///
/// Returns `ExportError::Columns` for an unknown column and
/// `ExportError::Data` when the read fails.
pub async fn render(
    store: &dyn SalesStore,
    config: &DashboardConfig,
    table: Table,
    columns: Option<&str>,
) -> Result<(String, usize), ExportError> {
    match table {
        Table::Customers => {
            let columns = select_columns::<CustomerRow>(columns)?;
            let today = chrono::Local::now().date_naive();
            let rows: Vec<CustomerRow> = store
                .fetch_customers()
                .await?
                .into_iter()
                .map(|customer| CustomerRow {
                    age: customer.age_on(today, config.age_rule),
                    customer,
                })
                .collect();
            Ok(encode(&rows, &columns))
        }
        Table::Products => {
            let columns = select_columns::<ProductRow>(columns)?;
            let rows: Vec<ProductRow> = store
                .fetch_products()
                .await?
                .into_iter()
                .map(|product| ProductRow {
                    status: product
                        .stock
                        .map(|s| StockStatus::classify(s, config.low_stock_threshold)),
                    product,
                })
                .collect();
            Ok(encode(&rows, &columns))
        }
        Table::Orders => {
            let columns = select_columns::<OrderSummary>(columns)?;
            let rows = store.fetch_orders_with_customers().await?;
            Ok(encode(&rows, &columns))
        }
        Table::OrderDetails => {
            let columns = select_columns::<OrderLine>(columns)?;
            let rows = store.fetch_order_details_with_info().await?;
            Ok(encode(&rows, &columns))
        }
    }
}

fn encode<R: TableRow>(rows: &[R], columns: &[&str]) -> (String, usize) {
    (to_csv(rows, columns), rows.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use sales_dashboard::db::{Entity, MemoryStore, SalesTables};
    use sales_dashboard_core::{Customer, CustomerId, Money, Product, ProductId};

    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::new(SalesTables {
            customers: vec![Customer {
                id: CustomerId::new(1),
                name: "Budi, Santoso".to_string(),
                email: Some("budi@example.com".to_string()),
                phone: None,
                address: None,
                birthdate: NaiveDate::from_ymd_opt(1990, 5, 1),
            }],
            products: vec![Product {
                id: ProductId::new(7),
                name: "Kopi Arabika".to_string(),
                description: None,
                price: Some(Money::from_units(85_000)),
                stock: Some(4),
            }],
            ..SalesTables::default()
        })
    }

    #[tokio::test]
    async fn test_customers_quoted() {
        let (csv, rows) = render(
            &store(),
            &DashboardConfig::default(),
            Table::Customers,
            Some("customer_id,name"),
        )
        .await
        .unwrap();
        assert_eq!(rows, 1);
        assert_eq!(csv, "customer_id,name\n1,\"Budi, Santoso\"\n");
    }

    #[tokio::test]
    async fn test_products_stock_status() {
        let (csv, _) = render(
            &store(),
            &DashboardConfig::default(),
            Table::Products,
            Some("name,stock,stock_status"),
        )
        .await
        .unwrap();
        assert_eq!(csv, "name,stock,stock_status\nKopi Arabika,4,Low\n");
    }

    #[tokio::test]
    async fn test_unknown_column() {
        let err = render(
            &store(),
            &DashboardConfig::default(),
            Table::Orders,
            Some("order_id,discount"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExportError::Columns(_)));
    }

    #[tokio::test]
    async fn test_failed_read_is_an_error() {
        let store = store().with_failing(Entity::OrderDetails);
        let err = render(
            &store,
            &DashboardConfig::default(),
            Table::OrderDetails,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExportError::Data(_)));
    }

    #[tokio::test]
    async fn test_offline_store_is_an_error() {
        let err = render(
            &MemoryStore::offline("no database"),
            &DashboardConfig::default(),
            Table::Customers,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExportError::Data(DataError::Offline { .. })));
    }
}
