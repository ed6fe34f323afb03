//! Connection status command.
//!
//! # Usage
//!
//! ```bash
//! sd-cli status
//! ```
//!
//! # Environment Variables
//!
//! - `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME` - connection settings
//! - `DB_MANAGED_SUFFIX` - host suffix that forces TLS

use sales_dashboard::db::{ConnectionStatus, SalesStore};
use thiserror::Error;

/// Errors from the status command.
#[derive(Debug, Error)]
pub enum StatusError {
    /// The store fell back to offline mode.
    #[error("Database offline: {0}")]
    Offline(String),
}

/// Connect, print the connection status, then close.
///
/// # Errors
///
/// Returns `StatusError::Offline` when no connection could be made.
#[allow(clippy::print_stdout)]
pub async fn run() -> Result<(), StatusError> {
    let store = super::open_store().await;
    let status = store.status();
    println!("{}", describe(&status));
    store.close().await;

    match status {
        ConnectionStatus::Offline { reason } => Err(StatusError::Offline(reason)),
        _ => Ok(()),
    }
}

/// Multi-line report of a connection status.
pub fn describe(status: &ConnectionStatus) -> String {
    match status {
        ConnectionStatus::Connected {
            server_version,
            target,
        } => format!(
            "Status:  {}\nTarget:  {}\nVersion: {server_version}",
            status.label(),
            target.label()
        ),
        ConnectionStatus::Offline { reason } => {
            format!("Status:  {}\nReason:  {reason}", status.label())
        }
        ConnectionStatus::Closed => format!("Status:  {}", status.label()),
    }
}

#[cfg(test)]
mod tests {
    use sales_dashboard::config::ConnectionTarget;

    use super::*;

    #[test]
    fn test_describe_connected() {
        let text = describe(&ConnectionStatus::Connected {
            server_version: "PostgreSQL 16.2".to_string(),
            target: ConnectionTarget::Managed,
        });
        assert!(text.contains("Managed PostgreSQL"));
        assert!(text.contains("PostgreSQL 16.2"));
    }

    #[test]
    fn test_describe_offline() {
        let text = describe(&ConnectionStatus::Offline {
            reason: "Missing environment variable: DB_HOST".to_string(),
        });
        assert!(text.starts_with("Status:  Offline Mode"));
        assert!(text.contains("DB_HOST"));
    }
}
