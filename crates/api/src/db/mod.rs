//! Entity store for customers, products and orders.
//!
//! # Backends
//!
//! - [`PgStore`] - `PostgreSQL` via `sqlx` (schema `crm`)
//! - [`MemoryStore`] - process-local maps, for development and tests
//!
//! Both are used through [`Store`] and [`StoreTx`]. Every operation runs in a
//! transaction: dropping a [`StoreTx`] without calling [`StoreTx::commit`]
//! discards everything it wrote.
//!
//! ## Tables
//!
//! - `crm.customer` - customers, unique on `email`
//! - `crm.product` - products, `price > 0`, `stock >= 0`
//! - `crm.customer_order` - orders with their total
//! - `crm.order_product` - order/product links
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p crm-cli -- migrate
//! ```

pub mod customers;
pub mod memory;
pub mod orders;
pub mod postgres;
pub mod products;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crm_core::{CustomerId, Email, OrderId, ProductId, Stock};

use crate::models::{
    Customer, CustomerFilter, NewCustomer, NewOrder, NewProduct, Order, OrderFilter, Page,
    PageRequest, Product, ProductFilter,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// A transactional entity store.
#[async_trait]
pub trait Store: Send + Sync {
    /// Open a transaction.
    async fn begin(&self) -> Result<Box<dyn StoreTx>, RepositoryError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Operations available inside a store transaction.
///
/// Reads observe the transaction's own earlier writes.
#[async_trait]
pub trait StoreTx: Send {
    // =========================================================================
    // Customers
    // =========================================================================

    async fn customer(&mut self, id: CustomerId) -> Result<Option<Customer>, RepositoryError>;

    async fn email_exists(&mut self, email: &Email) -> Result<bool, RepositoryError>;

    /// Insert a customer.
    ///
    /// A duplicate email fails with [`RepositoryError::Conflict`] and leaves
    /// the transaction usable, so a batch can keep going after a rejected item.
    async fn insert_customer(&mut self, new: &NewCustomer) -> Result<Customer, RepositoryError>;

    async fn customers(
        &mut self,
        filter: &CustomerFilter,
        page: PageRequest,
    ) -> Result<Page<Customer>, RepositoryError>;

    // =========================================================================
    // Products
    // =========================================================================

    async fn product(&mut self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Products whose ID is in `ids`, ascending by ID. Unknown IDs are skipped.
    async fn products_by_ids(&mut self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError>;

    async fn insert_product(&mut self, new: &NewProduct) -> Result<Product, RepositoryError>;

    async fn products(
        &mut self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, RepositoryError>;

    /// Products with `stock < threshold`, ascending by ID, locked for update.
    async fn low_stock_products(&mut self, threshold: i32) -> Result<Vec<Product>, RepositoryError>;

    /// Overwrite one product's stock and return the updated row.
    ///
    /// Fails with [`RepositoryError::NotFound`] if the product is gone.
    async fn set_stock(&mut self, id: ProductId, stock: Stock) -> Result<Product, RepositoryError>;

    // =========================================================================
    // Orders
    // =========================================================================

    async fn order(&mut self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Insert an order and its product links.
    async fn insert_order(&mut self, new: &NewOrder) -> Result<Order, RepositoryError>;

    async fn orders(
        &mut self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, RepositoryError>;

    /// Make every write in this transaction durable.
    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Escape `LIKE` metacharacters so user input matches literally.
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `ILIKE` pattern for a case-insensitive substring match.
pub(crate) fn contains_pattern(needle: &str) -> String {
    format!("%{}%", escape_like(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_contains_pattern() {
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
    }
}
