//! Database migrations.
//!
//! Migration files live in `crates/api/migrations/` and are embedded at
//! compile time.

use super::{CliError, connect};

/// Apply all pending migrations.
pub async fn run() -> Result<(), CliError> {
    let store = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(store.pool()).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
