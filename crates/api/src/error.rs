//! Startup and server errors.
//!
//! Request-level failures never reach this type: GraphQL reports them as field
//! errors (see `graphql::error`).

use thiserror::Error;

use crate::config::ConfigError;
use crate::db::RepositoryError;

/// Errors that stop the server from starting or keep it from serving.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Binding or serving the listener failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
