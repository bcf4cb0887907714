//! Order queries for `PostgreSQL`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, Postgres, QueryBuilder};

use crm_core::{CustomerId, OrderId, ProductId};

use super::{RepositoryError, contains_pattern};
use crate::models::{NewOrder, Order, OrderFilter, Page, PageRequest};

/// Order columns plus the linked product IDs as an array.
const ORDER_SELECT: &str = "SELECT o.id, o.customer_id, o.total_amount, o.order_date, \
     ARRAY(SELECT op.product_id FROM crm.order_product op \
           WHERE op.order_id = o.id ORDER BY op.product_id) AS product_ids \
     FROM crm.customer_order o";

/// Internal row type for `PostgreSQL` order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    customer_id: i32,
    total_amount: Decimal,
    order_date: DateTime<Utc>,
    product_ids: Vec<i32>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        if row.product_ids.is_empty() {
            return Err(RepositoryError::DataCorruption(format!(
                "order {} has no products",
                row.id
            )));
        }

        Ok(Self {
            id: OrderId::new(row.id),
            customer_id: CustomerId::new(row.customer_id),
            product_ids: row.product_ids.into_iter().map(ProductId::new).collect(),
            total_amount: row.total_amount,
            order_date: row.order_date,
        })
    }
}

/// Row returned by the order insert, before links exist.
#[derive(Debug, sqlx::FromRow)]
struct InsertedOrderRow {
    id: i32,
    order_date: DateTime<Utc>,
}

/// Order queries bound to one connection (usually a transaction).
pub struct OrderRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> OrderRepository<'c> {
    /// Create a repository over `conn`.
    #[must_use]
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&mut self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{ORDER_SELECT} WHERE o.id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        row.map(Order::try_from).transpose()
    }

    /// Insert an order and link its products.
    ///
    /// Must run inside a transaction so the order never exists without links.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the customer or a product was
    /// removed concurrently (foreign key violation).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(&mut self, new: &NewOrder) -> Result<Order, RepositoryError> {
        let inserted = sqlx::query_as::<_, InsertedOrderRow>(
            "INSERT INTO crm.customer_order (customer_id, total_amount) VALUES ($1, $2) \
             RETURNING id, order_date",
        )
        .bind(new.customer_id)
        .bind(new.total_amount)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(map_foreign_key)?;

        let mut product_ids = new.product_ids.clone();
        product_ids.sort_unstable();
        product_ids.dedup();
        let raw_ids: Vec<i32> = product_ids.iter().map(ProductId::as_i32).collect();

        sqlx::query(
            "INSERT INTO crm.order_product (order_id, product_id) \
             SELECT $1, unnest($2::int4[])",
        )
        .bind(inserted.id)
        .bind(raw_ids)
        .execute(&mut *self.conn)
        .await
        .map_err(map_foreign_key)?;

        Ok(Order {
            id: OrderId::new(inserted.id),
            customer_id: new.customer_id,
            product_ids,
            total_amount: new.total_amount,
            order_date: inserted.order_date,
        })
    }

    /// List one page of orders matching `filter`, ascending by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &mut self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(ORDER_SELECT);
        qb.push(" JOIN crm.customer c ON c.id = o.customer_id WHERE TRUE");

        if let Some(customer_id) = filter.customer_id {
            qb.push(" AND o.customer_id = ").push_bind(customer_id);
        }
        if let Some(name) = &filter.customer_name_icontains {
            qb.push(" AND c.name ILIKE ").push_bind(contains_pattern(name));
        }
        if let Some(name) = &filter.product_name_icontains {
            qb.push(
                " AND EXISTS (SELECT 1 FROM crm.order_product fp \
                 JOIN crm.product p ON p.id = fp.product_id \
                 WHERE fp.order_id = o.id AND p.name ILIKE ",
            )
            .push_bind(contains_pattern(name))
            .push(")");
        }
        if let Some(product_id) = filter.product_id {
            qb.push(
                " AND EXISTS (SELECT 1 FROM crm.order_product fp \
                 WHERE fp.order_id = o.id AND fp.product_id = ",
            )
            .push_bind(product_id)
            .push(")");
        }
        if let Some(min) = filter.total_amount_gte {
            qb.push(" AND o.total_amount >= ").push_bind(min);
        }
        if let Some(max) = filter.total_amount_lte {
            qb.push(" AND o.total_amount <= ").push_bind(max);
        }
        if let Some(from) = filter.order_date_gte {
            qb.push(" AND o.order_date >= ").push_bind(from);
        }
        if let Some(to) = filter.order_date_lte {
            qb.push(" AND o.order_date <= ").push_bind(to);
        }
        if let Some(after) = page.after {
            qb.push(" AND o.id > ").push_bind(after);
        }
        qb.push(" ORDER BY o.id LIMIT ").push_bind(page.fetch_limit());

        let rows = qb
            .build_query_as::<OrderRow>()
            .fetch_all(&mut *self.conn)
            .await?;

        let orders = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::from_overfetch(orders, page.first))
    }
}

fn map_foreign_key(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::Conflict("referenced customer or product no longer exists".to_owned());
    }
    RepositoryError::Database(e)
}
