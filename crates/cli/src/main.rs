//! CRM CLI - database migrations and maintenance jobs.
//!
//! # Usage
//!
//! ```bash
//! # Apply migrations from crates/api/migrations
//! crm-cli migrate
//!
//! # Insert sample customers, products and an order
//! crm-cli seed
//!
//! # Add stock to every product below the threshold (default 10)
//! crm-cli restock --threshold 5
//! ```
//!
//! All commands read the same environment as the server (`CRM_DATABASE_URL`,
//! falling back to `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use crm_api::services::DEFAULT_LOW_STOCK_THRESHOLD;

mod commands;

#[derive(Parser)]
#[command(name = "crm-cli")]
#[command(author, version, about = "CRM maintenance tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with sample data
    Seed,
    /// Restock low-stock products
    Restock {
        /// Products with stock strictly below this are restocked
        #[arg(short, long, default_value_t = DEFAULT_LOW_STOCK_THRESHOLD)]
        threshold: i32,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
        Commands::Restock { threshold } => commands::restock::run(threshold).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_restock_threshold_defaults() {
        let cli = Cli::try_parse_from(["crm-cli", "restock"]).ok();
        assert!(matches!(
            cli.map(|c| c.command),
            Some(Commands::Restock { threshold }) if threshold == DEFAULT_LOW_STOCK_THRESHOLD
        ));

        let cli = Cli::try_parse_from(["crm-cli", "restock", "--threshold", "3"]).ok();
        assert!(matches!(
            cli.map(|c| c.command),
            Some(Commands::Restock { threshold: 3 })
        ));
    }
}
