//! Product commands and queries.

use tracing::{info, instrument};

use crm_core::ProductId;

use super::{ServiceError, validation};
use crate::db::Store;
use crate::models::{CreateProductInput, Page, PageRequest, Product, ProductFilter};

/// Product service.
pub struct ProductService<'a> {
    store: &'a dyn Store,
}

impl<'a> ProductService<'a> {
    /// Create a new product service.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Create one product.
    ///
    /// # Errors
    ///
    /// Returns the first failing field rule (name, price, stock) as a
    /// `ServiceError::Validation`. Nothing is written on failure.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &CreateProductInput) -> Result<Product, ServiceError> {
        let new = validation::new_product(input)?;

        let mut tx = self.store.begin().await?;
        let product = tx.insert_product(&new).await?;
        tx.commit().await?;

        info!(product_id = %product.id, price = %product.price, "Product created");
        Ok(product)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, ServiceError> {
        let mut tx = self.store.begin().await?;
        Ok(tx.product(id).await?)
    }

    /// Products with the given IDs, ascending by ID. Unknown IDs are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, ServiceError> {
        let mut tx = self.store.begin().await?;
        Ok(tx.products_by_ids(ids).await?)
    }

    /// List one page of products.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, ServiceError> {
        let mut tx = self.store.begin().await?;
        Ok(tx.products(filter, page).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::MemoryStore;
    use crate::services::ValidationError;
    use crm_core::{PriceError, StockError};

    fn input(price: &str, stock: i32) -> CreateProductInput {
        CreateProductInput {
            name: "Widget".to_string(),
            price: price.parse().unwrap(),
            stock,
        }
    }

    async fn count(store: &MemoryStore) -> usize {
        ProductService::new(store)
            .list(&ProductFilter::default(), PageRequest::UNBOUNDED)
            .await
            .unwrap()
            .items
            .len()
    }

    #[tokio::test]
    async fn test_create_widget_with_zero_stock() {
        let store = MemoryStore::new();
        let service = ProductService::new(&store);

        let product = service.create(&input("9.99", 0)).await.unwrap();
        assert_eq!(product.name, "Widget");
        assert_eq!(product.price.amount(), Decimal::new(999, 2));
        assert_eq!(product.stock.units(), 0);

        assert_eq!(service.get(product.id).await.unwrap(), Some(product));
    }

    #[tokio::test]
    async fn test_rejects_non_positive_price() {
        let store = MemoryStore::new();
        let service = ProductService::new(&store);

        for price in ["0", "-5"] {
            let err = service.create(&input(price, 0)).await.unwrap_err();
            assert!(matches!(
                err,
                ServiceError::Validation(ValidationError::Price(PriceError::NotPositive))
            ));
            assert_eq!(err.to_string(), "Price must be positive");
        }
        assert_eq!(count(&store).await, 0);
    }

    #[tokio::test]
    async fn test_rejects_negative_stock() {
        let store = MemoryStore::new();
        let service = ProductService::new(&store);

        let err = service.create(&input("10", -1)).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::Stock(StockError::Negative))
        ));
        assert_eq!(err.to_string(), "Stock cannot be negative");
        assert_eq!(count(&store).await, 0);
    }

    #[tokio::test]
    async fn test_rejects_sub_cent_price() {
        let store = MemoryStore::new();
        let err = ProductService::new(&store)
            .create(&input("1.005", 1))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Price must have at most 2 decimal places");
    }

    #[tokio::test]
    async fn test_list_filters_low_stock() {
        let store = MemoryStore::new();
        let service = ProductService::new(&store);
        service.create(&input("1", 2)).await.unwrap();
        service.create(&input("1", 20)).await.unwrap();

        let filter = ProductFilter {
            stock_lt: Some(5),
            ..Default::default()
        };
        let page = service.list(&filter, PageRequest::new(10, None)).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].stock.units(), 2);
    }
}
