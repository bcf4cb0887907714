//! `PostgreSQL` store backend.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crm_core::{CustomerId, Email, OrderId, ProductId, Stock};

use super::customers::CustomerRepository;
use super::orders::OrderRepository;
use super::products::ProductRepository;
use super::{RepositoryError, Store, StoreTx};
use crate::models::{
    Customer, CustomerFilter, NewCustomer, NewOrder, NewProduct, Order, OrderFilter, Page,
    PageRequest, Product, ProductFilter,
};

/// Store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for migrations.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// An open `PostgreSQL` transaction. Rolled back on drop unless committed.
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

impl PgTx {
    fn customer_repo(&mut self) -> CustomerRepository<'_> {
        CustomerRepository::new(&mut self.tx)
    }

    fn product_repo(&mut self) -> ProductRepository<'_> {
        ProductRepository::new(&mut self.tx)
    }

    fn order_repo(&mut self) -> OrderRepository<'_> {
        OrderRepository::new(&mut self.tx)
    }
}

#[async_trait]
impl StoreTx for PgTx {
    async fn customer(&mut self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        self.customer_repo().get(id).await
    }

    async fn email_exists(&mut self, email: &Email) -> Result<bool, RepositoryError> {
        self.customer_repo().email_exists(email).await
    }

    async fn insert_customer(&mut self, new: &NewCustomer) -> Result<Customer, RepositoryError> {
        self.customer_repo().insert(new).await
    }

    async fn customers(
        &mut self,
        filter: &CustomerFilter,
        page: PageRequest,
    ) -> Result<Page<Customer>, RepositoryError> {
        self.customer_repo().list(filter, page).await
    }

    async fn product(&mut self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.product_repo().get(id).await
    }

    async fn products_by_ids(&mut self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        self.product_repo().get_many(ids).await
    }

    async fn insert_product(&mut self, new: &NewProduct) -> Result<Product, RepositoryError> {
        self.product_repo().insert(new).await
    }

    async fn products(
        &mut self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, RepositoryError> {
        self.product_repo().list(filter, page).await
    }

    async fn low_stock_products(&mut self, threshold: i32) -> Result<Vec<Product>, RepositoryError> {
        self.product_repo().low_stock(threshold).await
    }

    async fn set_stock(&mut self, id: ProductId, stock: Stock) -> Result<Product, RepositoryError> {
        self.product_repo().set_stock(id, stock).await
    }

    async fn order(&mut self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        self.order_repo().get(id).await
    }

    async fn insert_order(&mut self, new: &NewOrder) -> Result<Order, RepositoryError> {
        self.order_repo().insert(new).await
    }

    async fn orders(
        &mut self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, RepositoryError> {
        self.order_repo().list(filter, page).await
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }
}
