//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Store
//! - `CRM_STORE` - `postgres` (default) or `memory`
//! - `CRM_DATABASE_URL` - `PostgreSQL` connection string, falls back to
//!   `DATABASE_URL`; required when `CRM_STORE=postgres`
//!
//! ## Optional
//! - `CRM_HOST` - Bind address (default: 127.0.0.1)
//! - `CRM_PORT` - Listen port (default: 8000)
//! - `CRM_GRAPHIQL` - Serve GraphiQL at `/graphiql` (default: true)
//! - `CRM_BULK_POLICY` - Default for `bulkCreateCustomers`: `partial` (default)
//!   or `all_or_nothing`
//! - `CRM_PAGE_SIZE` - Default page size for listings (default: 20)
//! - `CRM_MAX_PAGE_SIZE` - Largest page size a client can request (default: 100)
//! - `CRM_LOG_FORMAT` - `text` (default) or `json`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 1.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

use crate::graphql::GraphqlSettings;
use crate::models::BulkPolicy;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which store backend to run against.
///
/// Implements `Debug` manually to redact the database URL.
#[derive(Clone)]
pub enum StoreConfig {
    /// `PostgreSQL` at the given URL (contains password).
    Postgres(SecretString),
    /// Process-local store; data is lost on exit.
    Memory,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Postgres(_) => f.debug_tuple("Postgres").field(&"[REDACTED]").finish(),
            Self::Memory => f.write_str("Memory"),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per line, for log shippers.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}' (expected 'text' or 'json')")),
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Store backend
    pub store: StoreConfig,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Whether `/graphiql` is served
    pub graphiql: bool,
    /// Resolver settings (bulk policy, page sizes)
    pub graphql: GraphqlSettings,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let store = match env.get_env_or_default("CRM_STORE", "postgres").trim() {
            "postgres" | "postgresql" => StoreConfig::Postgres(env.get_database_url("CRM_DATABASE_URL")?),
            "memory" => StoreConfig::Memory,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "CRM_STORE".to_string(),
                    format!("unknown store '{other}' (expected 'postgres' or 'memory')"),
                ));
            }
        };

        let host: IpAddr = env.parse_or_default("CRM_HOST", "127.0.0.1")?;
        let port: u16 = env.parse_or_default("CRM_PORT", "8000")?;
        let graphiql = env.get_bool("CRM_GRAPHIQL", true)?;
        let bulk_policy: BulkPolicy = env.parse_or_default("CRM_BULK_POLICY", "partial")?;
        let default_page_size: usize = env.parse_or_default("CRM_PAGE_SIZE", "20")?;
        let max_page_size: usize = env.parse_or_default("CRM_MAX_PAGE_SIZE", "100")?;
        if max_page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CRM_MAX_PAGE_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        if default_page_size == 0 || default_page_size > max_page_size {
            return Err(ConfigError::InvalidEnvVar(
                "CRM_PAGE_SIZE".to_string(),
                format!("must be between 1 and {max_page_size}"),
            ));
        }
        let log_format: LogFormat = env.parse_or_default("CRM_LOG_FORMAT", "text")?;

        let sentry_dsn = env.get_optional_env("SENTRY_DSN");
        let sentry_environment = env.get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env
            .get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env
            .get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            store,
            host,
            port,
            graphiql,
            graphql: GraphqlSettings {
                bulk_policy,
                default_page_size,
                max_page_size,
            },
            log_format,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
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

/// A source of environment variables.
struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable; empty values count as unset.
    fn get_optional_env(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn get_env_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional_env(key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Get database URL with fallback to generic `DATABASE_URL`.
    fn get_database_url(&self, primary_key: &str) -> Result<SecretString, ConfigError> {
        self.get_optional_env(primary_key)
            .or_else(|| self.get_optional_env("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or_default<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get_env_or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    fn get_bool(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        let Some(value) = self.get_optional_env(key) else {
            return Ok(default);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("expected a boolean, got '{value}'"),
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_database_url() {
        let config = load(&[("CRM_DATABASE_URL", "postgres://crm@localhost/crm")]).unwrap();

        assert!(matches!(
            &config.store,
            StoreConfig::Postgres(url) if url.expose_secret() == "postgres://crm@localhost/crm"
        ));
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8000");
        assert!(config.graphiql);
        assert_eq!(config.graphql, GraphqlSettings::default());
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.sentry_dsn.is_none());
        assert!((config.sentry_sample_rate - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://fallback")]).unwrap();
        assert!(matches!(
            &config.store,
            StoreConfig::Postgres(url) if url.expose_secret() == "postgres://fallback"
        ));
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "CRM_DATABASE_URL"));
    }

    #[test]
    fn test_memory_store_needs_no_database() {
        let config = load(&[
            ("CRM_STORE", "memory"),
            ("CRM_PORT", "9000"),
            ("CRM_GRAPHIQL", "off"),
            ("CRM_BULK_POLICY", "all_or_nothing"),
            ("CRM_LOG_FORMAT", "json"),
        ])
        .unwrap();

        assert!(matches!(config.store, StoreConfig::Memory));
        assert_eq!(config.port, 9000);
        assert!(!config.graphiql);
        assert_eq!(config.graphql.bulk_policy, BulkPolicy::AllOrNothing);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values() {
        let memory = ("CRM_STORE", "memory");
        assert!(matches!(
            load(&[memory, ("CRM_PORT", "eighty")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "CRM_PORT"
        ));
        assert!(matches!(
            load(&[memory, ("CRM_BULK_POLICY", "sometimes")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "CRM_BULK_POLICY"
        ));
        assert!(matches!(
            load(&[memory, ("CRM_PAGE_SIZE", "500")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "CRM_PAGE_SIZE"
        ));
        assert!(matches!(
            load(&[("CRM_STORE", "redis")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "CRM_STORE"
        ));
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = load(&[("CRM_DATABASE_URL", "postgres://user:hunter2@db/crm")]).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }
}
