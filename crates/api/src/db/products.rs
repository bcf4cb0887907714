//! Product queries for `PostgreSQL`.

use rust_decimal::Decimal;
use sqlx::{PgConnection, Postgres, QueryBuilder};

use crm_core::{Price, ProductId, Stock};

use super::{RepositoryError, contains_pattern};
use crate::models::{NewProduct, Page, PageRequest, Product, ProductFilter};

const PRODUCT_COLUMNS: &str = "id, name, price, stock";

/// Internal row type for `PostgreSQL` product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    price: Decimal,
    stock: i32,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", row.id))
        })?;
        let stock = Stock::new(row.stock).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid stock for product {}: {e}", row.id))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            price,
            stock,
        })
    }
}

fn into_products(rows: Vec<ProductRow>) -> Result<Vec<Product>, RepositoryError> {
    rows.into_iter().map(Product::try_from).collect()
}

/// Product queries bound to one connection (usually a transaction).
pub struct ProductRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> ProductRepository<'c> {
    /// Create a repository over `conn`.
    #[must_use]
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&mut self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM crm.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Get every product whose ID is in `ids`, ascending by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many(&mut self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM crm.product WHERE id = ANY($1) ORDER BY id"
        ))
        .bind(ids)
        .fetch_all(&mut *self.conn)
        .await?;

        into_products(rows)
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert(&mut self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO crm.product (name, price, stock) VALUES ($1, $2, $3) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&new.name)
        .bind(new.price)
        .bind(new.stock)
        .fetch_one(&mut *self.conn)
        .await?;

        row.try_into()
    }

    /// List one page of products matching `filter`, ascending by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &mut self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM crm.product WHERE TRUE"
        ));

        if let Some(name) = &filter.name_icontains {
            qb.push(" AND name ILIKE ").push_bind(contains_pattern(name));
        }
        if let Some(min) = filter.price_gte {
            qb.push(" AND price >= ").push_bind(min);
        }
        if let Some(max) = filter.price_lte {
            qb.push(" AND price <= ").push_bind(max);
        }
        if let Some(min) = filter.stock_gte {
            qb.push(" AND stock >= ").push_bind(min);
        }
        if let Some(max) = filter.stock_lte {
            qb.push(" AND stock <= ").push_bind(max);
        }
        if let Some(limit) = filter.stock_lt {
            qb.push(" AND stock < ").push_bind(limit);
        }
        if let Some(after) = page.after {
            qb.push(" AND id > ").push_bind(after);
        }
        qb.push(" ORDER BY id LIMIT ").push_bind(page.fetch_limit());

        let rows = qb
            .build_query_as::<ProductRow>()
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(Page::from_overfetch(into_products(rows)?, page.first))
    }

    /// Lock and return products with `stock < threshold`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn low_stock(&mut self, threshold: i32) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM crm.product WHERE stock < $1 ORDER BY id FOR UPDATE"
        ))
        .bind(threshold)
        .fetch_all(&mut *self.conn)
        .await?;

        into_products(rows)
    }

    /// Save a new stock level for one product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_stock(
        &mut self,
        id: ProductId,
        stock: Stock,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE crm.product SET stock = $2 WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(stock)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }
}
