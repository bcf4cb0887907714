//! Order creation and queries.
//!
//! `create` runs its checks in a fixed order and stops at the first failure:
//!
//! 1. the product list is non-empty (no store access needed)
//! 2. the customer exists
//! 3. every distinct product ID exists
//!
//! The total is the exact decimal sum of the resolved prices, always carried
//! with two decimal places. The order and
//! its product links are written in the same transaction.

use rust_decimal::Decimal;
use tracing::{info, instrument};

use crm_core::{CustomerId, OrderId, Price};

use super::{ServiceError, ValidationError, validation};
use crate::db::Store;
use crate::models::{CreateOrderInput, NewOrder, Order, OrderFilter, Page, PageRequest};

/// Order service.
pub struct OrderService<'a> {
    store: &'a dyn Store,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Place an order for existing products.
    ///
    /// Repeated product IDs are collapsed: each product is linked and charged
    /// once.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NoProducts`, `InvalidCustomer` or
    /// `InvalidProducts`, checked in that order. Malformed IDs are treated as
    /// unknown ones. Nothing is written on failure.
    #[instrument(skip(self, input), fields(customer_id = %input.customer_id))]
    pub async fn create(&self, input: &CreateOrderInput) -> Result<Order, ServiceError> {
        if input.product_ids.is_empty() {
            return Err(ValidationError::NoProducts.into());
        }

        let customer_id = input
            .customer_id
            .parse::<CustomerId>()
            .map_err(|_| ValidationError::InvalidCustomer)?;

        let mut tx = self.store.begin().await?;

        if tx.customer(customer_id).await?.is_none() {
            return Err(ValidationError::InvalidCustomer.into());
        }

        let product_ids = validation::distinct_product_ids(&input.product_ids)?;
        let products = tx.products_by_ids(&product_ids).await?;
        if products.len() != product_ids.len() {
            return Err(ValidationError::InvalidProducts.into());
        }

        let mut total_amount: Decimal = products.iter().map(|p| &p.price).sum();
        total_amount.rescale(Price::SCALE);

        let order = tx
            .insert_order(&NewOrder {
                customer_id,
                product_ids,
                total_amount,
            })
            .await?;
        tx.commit().await?;

        info!(
            order_id = %order.id,
            products = order.product_ids.len(),
            total = %order.total_amount,
            "Order created"
        );
        Ok(order)
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, ServiceError> {
        let mut tx = self.store.begin().await?;
        Ok(tx.order(id).await?)
    }

    /// List one page of orders.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn list(
        &self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, ServiceError> {
        let mut tx = self.store.begin().await?;
        Ok(tx.orders(filter, page).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{CreateCustomerInput, CreateProductInput, Customer, Product};
    use crate::services::{CustomerService, ProductService};
    use crm_core::ProductId;

    struct Fixture {
        store: MemoryStore,
        customer: Customer,
        laptop: Product,
        mouse: Product,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let customer = CustomerService::new(&store)
            .create(&CreateCustomerInput::new("Alice", "alice@example.com", None))
            .await
            .unwrap();
        let products = ProductService::new(&store);
        let laptop = products
            .create(&CreateProductInput {
                name: "Laptop".to_string(),
                price: "999.99".parse().unwrap(),
                stock: 5,
            })
            .await
            .unwrap();
        let mouse = products
            .create(&CreateProductInput {
                name: "Mouse".to_string(),
                price: "0.01".parse().unwrap(),
                stock: 50,
            })
            .await
            .unwrap();
        Fixture {
            store,
            customer,
            laptop,
            mouse,
        }
    }

    async fn order_count(store: &MemoryStore) -> usize {
        OrderService::new(store)
            .list(&OrderFilter::default(), PageRequest::UNBOUNDED)
            .await
            .unwrap()
            .items
            .len()
    }

    fn validation_error(err: ServiceError) -> ValidationError {
        match err {
            ServiceError::Validation(e) => e,
            ServiceError::Repository(e) => panic!("unexpected repository error: {e}"),
        }
    }

    #[tokio::test]
    async fn test_total_is_exact_sum() {
        let f = fixture().await;
        let service = OrderService::new(&f.store);

        let order = service
            .create(&CreateOrderInput::new(f.customer.id, &[f.laptop.id, f.mouse.id]))
            .await
            .unwrap();

        assert_eq!(order.total_amount, "1000.00".parse::<Decimal>().unwrap());
        assert_eq!(order.customer_id, f.customer.id);
        assert_eq!(order.product_ids, vec![f.laptop.id, f.mouse.id]);
        assert_eq!(service.get(order.id).await.unwrap(), Some(order));
    }

    #[tokio::test]
    async fn test_repeated_product_is_linked_once() {
        let f = fixture().await;

        let order = OrderService::new(&f.store)
            .create(&CreateOrderInput::new(f.customer.id, &[f.laptop.id, f.laptop.id]))
            .await
            .unwrap();

        assert_eq!(order.product_ids, vec![f.laptop.id]);
        assert_eq!(order.total_amount, f.laptop.price.amount());
    }

    #[tokio::test]
    async fn test_total_always_has_two_decimal_places() {
        let f = fixture().await;
        let desk = ProductService::new(&f.store)
            .create(&CreateProductInput {
                name: "Desk".to_string(),
                price: "250.00".parse().unwrap(),
                stock: 1,
            })
            .await
            .unwrap();
        assert_eq!(desk.price.to_string(), "250");

        let service = OrderService::new(&f.store);
        let single = service
            .create(&CreateOrderInput::new(f.customer.id, &[desk.id]))
            .await
            .unwrap();
        let pair = service
            .create(&CreateOrderInput::new(f.customer.id, &[f.laptop.id, f.mouse.id]))
            .await
            .unwrap();

        assert_eq!(single.total_amount.to_string(), "250.00");
        assert_eq!(pair.total_amount.to_string(), "1000.00");
    }

    #[tokio::test]
    async fn test_empty_products_rejected_even_for_unknown_customer() {
        let f = fixture().await;
        let service = OrderService::new(&f.store);

        let err = service
            .create(&CreateOrderInput::new(CustomerId::new(999), &[]))
            .await
            .unwrap_err();
        assert_eq!(validation_error(err), ValidationError::NoProducts);

        let err = service
            .create(&CreateOrderInput::new(f.customer.id, &[]))
            .await
            .unwrap_err();
        assert_eq!(validation_error(err), ValidationError::NoProducts);
        assert_eq!(order_count(&f.store).await, 0);
    }

    #[tokio::test]
    async fn test_unknown_customer_checked_before_products() {
        let f = fixture().await;

        let err = OrderService::new(&f.store)
            .create(&CreateOrderInput::new(
                CustomerId::new(999),
                &[ProductId::new(12345)],
            ))
            .await
            .unwrap_err();
        assert_eq!(validation_error(err), ValidationError::InvalidCustomer);
        assert_eq!(order_count(&f.store).await, 0);
    }

    #[tokio::test]
    async fn test_malformed_ids() {
        let f = fixture().await;
        let service = OrderService::new(&f.store);

        let bad_customer = CreateOrderInput {
            customer_id: "abc".to_string(),
            product_ids: vec!["xyz".to_string()],
        };
        let err = service.create(&bad_customer).await.unwrap_err();
        assert_eq!(validation_error(err), ValidationError::InvalidCustomer);

        let bad_product = CreateOrderInput {
            customer_id: f.customer.id.to_string(),
            product_ids: vec![f.laptop.id.to_string(), "xyz".to_string()],
        };
        let err = service.create(&bad_product).await.unwrap_err();
        assert_eq!(validation_error(err), ValidationError::InvalidProducts);
    }

    #[tokio::test]
    async fn test_unknown_product_rejected() {
        let f = fixture().await;

        let err = OrderService::new(&f.store)
            .create(&CreateOrderInput::new(
                f.customer.id,
                &[f.laptop.id, ProductId::new(999)],
            ))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "One or more product IDs are invalid");
        assert_eq!(validation_error(err), ValidationError::InvalidProducts);
        assert_eq!(order_count(&f.store).await, 0);
    }

    #[tokio::test]
    async fn test_customer_orders_lists_only_theirs() {
        let f = fixture().await;
        let other = CustomerService::new(&f.store)
            .create(&CreateCustomerInput::new("Bob", "bob@example.com", None))
            .await
            .unwrap();
        let service = OrderService::new(&f.store);
        service
            .create(&CreateOrderInput::new(f.customer.id, &[f.mouse.id]))
            .await
            .unwrap();
        service
            .create(&CreateOrderInput::new(other.id, &[f.laptop.id]))
            .await
            .unwrap();

        let orders = CustomerService::new(&f.store)
            .orders(f.customer.id)
            .await
            .unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].product_ids, vec![f.mouse.id]);
    }
}
