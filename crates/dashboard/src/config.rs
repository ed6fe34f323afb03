//! Dashboard configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Database (required for live data)
//! - `DB_HOST` - Database host. Hosts ending in the managed suffix require TLS.
//! - `DB_USER` - Database user
//! - `DB_PASSWORD` - Database password
//! - `DB_NAME` - Database name
//!
//! Missing database variables do not stop the dashboard: it starts in
//! offline mode and every page renders empty.
//!
//! ## Database (optional)
//! - `DB_PORT` - Database port (default: 5432)
//! - `DB_MANAGED_SUFFIX` - Managed-database host suffix (default: supabase.co)
//! - `DB_MAX_CONNECTIONS` - Pool size (default: 5)
//!
//! ## Server (optional)
//! - `DASHBOARD_HOST` - Bind address (default: 127.0.0.1)
//! - `DASHBOARD_PORT` - Listen port (default: 8501)
//! - `DASHBOARD_AGE_RULE` - `calendar` or `days365` (default: calendar)
//! - `DASHBOARD_LOW_STOCK_THRESHOLD` - Default low-stock threshold (default: 20)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sample rates (default: 1.0)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

use sales_dashboard_core::AgeRule;

const DEFAULT_DB_PORT: &str = "5432";
const DEFAULT_MANAGED_SUFFIX: &str = "supabase.co";
const DEFAULT_MAX_CONNECTIONS: &str = "5";
const DEFAULT_LOW_STOCK_THRESHOLD: &str = "20";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where the configured database lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionTarget {
    /// Hosted database reached over the internet. TLS is required.
    Managed,
    /// Self-hosted or local instance. TLS is negotiated, not forced.
    Local,
}

impl ConnectionTarget {
    /// Infer the target from the host name.
    ///
    /// Only a non-empty suffix can match; an empty host is always `Local`.
    #[must_use]
    pub fn detect(host: &str, managed_suffix: &str) -> Self {
        let host = host.trim().trim_end_matches('.').to_ascii_lowercase();
        let suffix = managed_suffix.trim().to_ascii_lowercase();
        if !suffix.is_empty() && !host.is_empty() && host.ends_with(&suffix) {
            Self::Managed
        } else {
            Self::Local
        }
    }

    #[must_use]
    pub const fn requires_tls(self) -> bool {
        matches!(self, Self::Managed)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Managed => "Managed PostgreSQL",
            Self::Local => "Local PostgreSQL",
        }
    }
}

/// Database connection settings.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: SecretString,
    pub database: String,
    /// Host suffix that marks a managed database
    pub managed_suffix: String,
    /// Upper bound on pooled connections
    pub max_connections: u32,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("database", &self.database)
            .field("managed_suffix", &self.managed_suffix)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl DatabaseConfig {
    /// Load database settings from the process environment.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a numeric
    /// variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_source(&|key| std::env::var(key).ok())
    }

    /// Load database settings from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`DatabaseConfig::from_env`].
    pub fn from_source(source: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = EnvSource(source);
        let port = vars
            .or_default("DB_PORT", DEFAULT_DB_PORT)
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("DB_PORT".to_string(), e.to_string()))?;
        let max_connections = vars
            .or_default("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)
            .parse::<u32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("DB_MAX_CONNECTIONS".to_string(), e.to_string())
            })?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "DB_MAX_CONNECTIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            host: vars.required("DB_HOST")?,
            port,
            user: vars.required("DB_USER")?,
            password: SecretString::from(vars.required("DB_PASSWORD")?),
            database: vars.required("DB_NAME")?,
            managed_suffix: vars.or_default("DB_MANAGED_SUFFIX", DEFAULT_MANAGED_SUFFIX),
            max_connections,
        })
    }

    /// The connection target implied by the host.
    #[must_use]
    pub fn target(&self) -> ConnectionTarget {
        ConnectionTarget::detect(&self.host, &self.managed_suffix)
    }
}

/// Server and presentation configuration.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Rule used to derive customer ages
    pub age_rule: AgeRule,
    /// Low-stock threshold used when the request does not set one
    pub low_stock_threshold: i64,
    /// Emit JSON logs instead of text
    pub json_logs: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8501,
            age_rule: AgeRule::default(),
            low_stock_threshold: 20,
            json_logs: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_source(&|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`DashboardConfig::from_env`].
    pub fn from_source(source: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = EnvSource(source);
        let host = vars
            .or_default("DASHBOARD_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("DASHBOARD_HOST".to_string(), e.to_string()))?;
        let port = vars
            .or_default("DASHBOARD_PORT", "8501")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("DASHBOARD_PORT".to_string(), e.to_string()))?;
        let age_rule = vars
            .or_default("DASHBOARD_AGE_RULE", AgeRule::default().as_str())
            .parse::<AgeRule>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("DASHBOARD_AGE_RULE".to_string(), e.to_string())
            })?;
        let low_stock_threshold = vars
            .or_default("DASHBOARD_LOW_STOCK_THRESHOLD", DEFAULT_LOW_STOCK_THRESHOLD)
            .parse::<i64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "DASHBOARD_LOW_STOCK_THRESHOLD".to_string(),
                    e.to_string(),
                )
            })?;
        let json_logs = vars
            .optional("LOG_FORMAT")
            .is_some_and(|format| format.eq_ignore_ascii_case("json"));

        Ok(Self {
            host,
            port,
            age_rule,
            low_stock_threshold,
            json_logs,
            sentry_dsn: vars.optional("SENTRY_DSN"),
            sentry_environment: vars.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: vars
                .optional("SENTRY_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
            sentry_traces_sample_rate: vars
                .optional("SENTRY_TRACES_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with the usual required/optional/default helpers.
struct EnvSource<'a>(&'a dyn Fn(&str) -> Option<String>);

impl EnvSource<'_> {
    /// Get an optional variable. Blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn full_db_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("DB_HOST", "db.abc.supabase.co"),
            ("DB_USER", "reporter"),
            ("DB_PASSWORD", "s3cr3t-pa55"),
            ("DB_NAME", "sales_db"),
        ]
    }

    #[test]
    fn test_detect_managed_suffix() {
        assert_eq!(
            ConnectionTarget::detect("db.abc.supabase.co", "supabase.co"),
            ConnectionTarget::Managed
        );
        assert_eq!(
            ConnectionTarget::detect("DB.ABC.SUPABASE.CO.", "supabase.co"),
            ConnectionTarget::Managed
        );
    }

    #[test]
    fn test_detect_local_hosts() {
        assert_eq!(
            ConnectionTarget::detect("localhost", "supabase.co"),
            ConnectionTarget::Local
        );
        assert_eq!(ConnectionTarget::detect("", "supabase.co"), ConnectionTarget::Local);
        assert_eq!(
            ConnectionTarget::detect("supabase.co.internal", "supabase.co"),
            ConnectionTarget::Local
        );
        assert_eq!(ConnectionTarget::detect("db.local", ""), ConnectionTarget::Local);
    }

    #[test]
    fn test_only_managed_requires_tls() {
        assert!(ConnectionTarget::Managed.requires_tls());
        assert!(!ConnectionTarget::Local.requires_tls());
    }

    #[test]
    fn test_database_config_loads_with_defaults() {
        let config = DatabaseConfig::from_source(&source(&full_db_env())).unwrap();
        assert_eq!(config.port, 5432);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.managed_suffix, "supabase.co");
        assert_eq!(config.password.expose_secret(), "s3cr3t-pa55");
        assert_eq!(config.target(), ConnectionTarget::Managed);
    }

    #[test]
    fn test_database_config_missing_host() {
        let env: Vec<_> = full_db_env()
            .into_iter()
            .filter(|(k, _)| *k != "DB_HOST")
            .collect();
        let err = DatabaseConfig::from_source(&source(&env)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "DB_HOST"));
    }

    #[test]
    fn test_database_config_blank_password_is_missing() {
        let mut env = full_db_env();
        env.retain(|(k, _)| *k != "DB_PASSWORD");
        env.push(("DB_PASSWORD", "   "));
        let err = DatabaseConfig::from_source(&source(&env)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "DB_PASSWORD"));
    }

    #[test]
    fn test_database_config_invalid_port() {
        let mut env = full_db_env();
        env.push(("DB_PORT", "not-a-port"));
        let err = DatabaseConfig::from_source(&source(&env)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "DB_PORT"));
    }

    #[test]
    fn test_database_config_zero_pool_rejected() {
        let mut env = full_db_env();
        env.push(("DB_MAX_CONNECTIONS", "0"));
        assert!(DatabaseConfig::from_source(&source(&env)).is_err());
    }

    #[test]
    fn test_database_config_debug_redacts_password() {
        let config = DatabaseConfig::from_source(&source(&full_db_env())).unwrap();
        let debug_output = format!("{config:?}");

        // Public fields should be visible
        assert!(debug_output.contains("db.abc.supabase.co"));
        assert!(debug_output.contains("sales_db"));

        // Secret fields should be redacted
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("s3cr3t-pa55"));
    }

    #[test]
    fn test_dashboard_config_defaults() {
        let config = DashboardConfig::from_source(&source(&[])).unwrap();
        assert_eq!(config.port, 8501);
        assert_eq!(config.age_rule, AgeRule::Calendar);
        assert_eq!(config.low_stock_threshold, 20);
        assert!(!config.json_logs);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_dashboard_config_overrides() {
        let config = DashboardConfig::from_source(&source(&[
            ("DASHBOARD_HOST", "0.0.0.0"),
            ("DASHBOARD_PORT", "9000"),
            ("DASHBOARD_AGE_RULE", "days365"),
            ("DASHBOARD_LOW_STOCK_THRESHOLD", "5"),
            ("LOG_FORMAT", "JSON"),
        ]))
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:9000");
        assert_eq!(config.age_rule, AgeRule::DayCount365);
        assert_eq!(config.low_stock_threshold, 5);
        assert!(config.json_logs);
    }

    #[test]
    fn test_dashboard_config_rejects_unknown_age_rule() {
        let err = DashboardConfig::from_source(&source(&[("DASHBOARD_AGE_RULE", "lunar")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "DASHBOARD_AGE_RULE"));
    }
}
