//! Command implementations.

pub mod migrate;
pub mod restock;
pub mod seed;

use crm_api::config::{ApiConfig, ConfigError, StoreConfig};
use crm_api::db::{self, PgStore};
use crm_api::services::ServiceError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Commands act on the database; the memory store has nothing to act on.
    #[error("CRM_STORE=memory is not supported by this command")]
    MemoryStore,

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Connect to the configured `PostgreSQL` database.
pub(crate) async fn connect() -> Result<PgStore, CliError> {
    let config = ApiConfig::from_env()?;
    let StoreConfig::Postgres(url) = &config.store else {
        return Err(CliError::MemoryStore);
    };

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(url).await?;
    Ok(PgStore::new(pool))
}
