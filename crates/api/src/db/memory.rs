//! In-memory store backend.
//!
//! Transactions take an exclusive lock on the whole data set and work on a
//! copy; commit swaps the copy in. Concurrent transactions therefore run one
//! after another, which is plenty for local development and tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crm_core::{CustomerId, Email, OrderId, ProductId, Stock};

use super::{RepositoryError, Store, StoreTx};
use crate::models::{
    Customer, CustomerFilter, Keyed, NewCustomer, NewOrder, NewProduct, Order, OrderFilter, Page,
    PageRequest, Product, ProductFilter,
};

/// Store holding all records in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<MemoryData>>,
}

#[derive(Debug, Clone, Default)]
struct MemoryData {
    customers: BTreeMap<CustomerId, Customer>,
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    last_customer_id: i32,
    last_product_id: i32,
    last_order_id: i32,
    /// Product whose next stock update fails, to exercise rollback paths.
    #[cfg(test)]
    fail_stock_update: Option<ProductId>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `set_stock` call for `id` fail with a database error.
    #[cfg(test)]
    pub(crate) async fn fail_stock_update(&self, id: ProductId) {
        self.data.lock().await.fail_stock_update = Some(id);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, RepositoryError> {
        let guard = Arc::clone(&self.data).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// A transaction over [`MemoryStore`]. Discarded on drop unless committed.
pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryData>,
    working: MemoryData,
}

fn next_id(last: &mut i32) -> Result<i32, RepositoryError> {
    *last = last
        .checked_add(1)
        .ok_or_else(|| RepositoryError::Conflict("id sequence exhausted".to_owned()))?;
    Ok(*last)
}

fn page_of<T: Keyed + Clone>(
    rows: impl Iterator<Item = T>,
    page: PageRequest,
) -> Page<T> {
    let fetched = rows
        .filter(|row| page.admits(row.key()))
        .take(page.first.saturating_add(1))
        .collect();
    Page::from_overfetch(fetched, page.first)
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn customer(&mut self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.working.customers.get(&id).cloned())
    }

    async fn email_exists(&mut self, email: &Email) -> Result<bool, RepositoryError> {
        Ok(self
            .working
            .customers
            .values()
            .any(|c| &c.email == email))
    }

    async fn insert_customer(&mut self, new: &NewCustomer) -> Result<Customer, RepositoryError> {
        if self.email_exists(&new.email).await? {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let id = CustomerId::new(next_id(&mut self.working.last_customer_id)?);
        let customer = Customer {
            id,
            name: new.name.clone(),
            email: new.email.clone(),
            phone: new.phone.clone(),
            created_at: Utc::now(),
        };
        self.working.customers.insert(id, customer.clone());
        Ok(customer)
    }

    async fn customers(
        &mut self,
        filter: &CustomerFilter,
        page: PageRequest,
    ) -> Result<Page<Customer>, RepositoryError> {
        let rows = self
            .working
            .customers
            .values()
            .filter(|c| filter.matches(c))
            .cloned();
        Ok(page_of(rows, page))
    }

    async fn product(&mut self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.working.products.get(&id).cloned())
    }

    async fn products_by_ids(&mut self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        Ok(self
            .working
            .products
            .values()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn insert_product(&mut self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let id = ProductId::new(next_id(&mut self.working.last_product_id)?);
        let product = Product {
            id,
            name: new.name.clone(),
            price: new.price,
            stock: new.stock,
        };
        self.working.products.insert(id, product.clone());
        Ok(product)
    }

    async fn products(
        &mut self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, RepositoryError> {
        let rows = self
            .working
            .products
            .values()
            .filter(|p| filter.matches(p))
            .cloned();
        Ok(page_of(rows, page))
    }

    async fn low_stock_products(&mut self, threshold: i32) -> Result<Vec<Product>, RepositoryError> {
        Ok(self
            .working
            .products
            .values()
            .filter(|p| p.stock.is_below(threshold))
            .cloned()
            .collect())
    }

    async fn set_stock(&mut self, id: ProductId, stock: Stock) -> Result<Product, RepositoryError> {
        #[cfg(test)]
        if self.working.fail_stock_update == Some(id) {
            self.working.fail_stock_update = None;
            self.guard.fail_stock_update = None;
            return Err(RepositoryError::Database(sqlx::Error::PoolClosed));
        }

        let product = self
            .working
            .products
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        product.stock = stock;
        Ok(product.clone())
    }

    async fn order(&mut self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.working.orders.get(&id).cloned())
    }

    async fn insert_order(&mut self, new: &NewOrder) -> Result<Order, RepositoryError> {
        let mut product_ids = new.product_ids.clone();
        product_ids.sort_unstable();
        product_ids.dedup();

        let references_exist = self.working.customers.contains_key(&new.customer_id)
            && product_ids
                .iter()
                .all(|id| self.working.products.contains_key(id));
        if !references_exist {
            return Err(RepositoryError::Conflict(
                "referenced customer or product no longer exists".to_owned(),
            ));
        }

        let id = OrderId::new(next_id(&mut self.working.last_order_id)?);
        let order = Order {
            id,
            customer_id: new.customer_id,
            product_ids,
            total_amount: new.total_amount,
            order_date: Utc::now(),
        };
        self.working.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn orders(
        &mut self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, RepositoryError> {
        let data = &self.working;
        let rows = data
            .orders
            .values()
            .filter(|order| {
                let Some(customer) = data.customers.get(&order.customer_id) else {
                    return false;
                };
                let products: Vec<&Product> = order
                    .product_ids
                    .iter()
                    .filter_map(|id| data.products.get(id))
                    .collect();
                filter.matches(order, customer, &products)
            })
            .cloned();
        Ok(page_of(rows, page))
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let Self { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
