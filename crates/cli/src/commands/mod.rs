//! CLI command implementations.

pub mod export;
pub mod status;

use sales_dashboard::config::DatabaseConfig;
use sales_dashboard::db::PgSalesStore;

/// Connect with the dashboard's database settings.
///
/// Incomplete settings yield an offline store, same as the web binary.
pub async fn open_store() -> PgSalesStore {
    match DatabaseConfig::from_env() {
        Ok(config) => PgSalesStore::connect(&config).await,
        Err(e) => {
            tracing::warn!(error = %e, "Database settings incomplete");
            PgSalesStore::offline(e.to_string())
        }
    }
}
