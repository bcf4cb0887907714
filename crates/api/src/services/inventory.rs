//! Low-stock restocking.

use tracing::{info, instrument};

use super::{ServiceError, ValidationError};
use crate::db::Store;
use crate::models::Product;

/// Units added to each low-stock product.
pub const RESTOCK_AMOUNT: i32 = 10;

/// Threshold used when the caller does not pass one.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 10;

/// Result of a restock run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestockOutcome {
    /// Products after the increment, ascending by ID.
    pub updated_products: Vec<Product>,
    pub message: String,
}

/// Inventory service.
pub struct InventoryService<'a> {
    store: &'a dyn Store,
}

impl<'a> InventoryService<'a> {
    /// Create a new inventory service.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Add [`RESTOCK_AMOUNT`] units to every product with stock below
    /// `threshold`.
    ///
    /// Each product is saved by its own update, all in one transaction: a
    /// failure part-way leaves every product unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Stock` if an increment would overflow, or
    /// `ServiceError::Repository` if the store fails.
    #[instrument(skip(self))]
    pub async fn restock_low_stock(&self, threshold: i32) -> Result<RestockOutcome, ServiceError> {
        let mut tx = self.store.begin().await?;
        let low = tx.low_stock_products(threshold).await?;

        let mut updated_products = Vec::with_capacity(low.len());
        for product in low {
            let stock = product
                .stock
                .add(RESTOCK_AMOUNT)
                .map_err(ValidationError::from)?;
            updated_products.push(tx.set_stock(product.id, stock).await?);
        }

        tx.commit().await?;

        let message = format!(
            "Updated {} low-stock products (threshold: {threshold}).",
            updated_products.len()
        );
        info!(updated = updated_products.len(), threshold, "Restocked low-stock products");

        Ok(RestockOutcome {
            updated_products,
            message,
        })
    }
}
