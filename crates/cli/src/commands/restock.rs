//! Low-stock restocking, for running from cron.

use crm_api::services::InventoryService;

use super::{CliError, connect};

/// Restock every product with stock below `threshold`.
pub async fn run(threshold: i32) -> Result<(), CliError> {
    let store = connect().await?;

    let outcome = InventoryService::new(&store)
        .restock_low_stock(threshold)
        .await?;

    for product in &outcome.updated_products {
        tracing::info!(
            product_id = %product.id,
            stock = %product.stock,
            "Restocked {}",
            product.name
        );
    }
    tracing::info!("{}", outcome.message);
    Ok(())
}
