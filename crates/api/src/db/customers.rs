//! Customer queries for `PostgreSQL`.
//!
//! Queries are built at runtime (`query_as` / `QueryBuilder`) so the crate
//! compiles without a live database.

use chrono::{DateTime, Utc};
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder};

use crm_core::{CustomerId, Email};

use super::{RepositoryError, contains_pattern, escape_like};
use crate::models::{Customer, CustomerFilter, NewCustomer, Page, PageRequest};

const CUSTOMER_COLUMNS: &str = "id, name, email, phone, created_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` customer queries.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i32,
    name: String,
    email: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: CustomerId::new(row.id),
            name: row.name,
            email,
            phone: row.phone,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Customer queries bound to one connection (usually a transaction).
pub struct CustomerRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> CustomerRepository<'c> {
    /// Create a repository over `conn`.
    #[must_use]
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&mut self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM crm.customer WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(Customer::try_from).transpose()
    }

    /// Check whether any customer already uses `email`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_exists(&mut self, email: &Email) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM crm.customer WHERE email = $1)")
                .bind(email)
                .fetch_one(&mut *self.conn)
                .await?;

        Ok(exists)
    }

    /// Insert a customer inside a savepoint.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists; the
    /// savepoint is rolled back and the enclosing transaction stays usable.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(&mut self, new: &NewCustomer) -> Result<Customer, RepositoryError> {
        let mut savepoint = self.conn.begin().await?;

        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "INSERT INTO crm.customer (name, email, phone) VALUES ($1, $2, $3) \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.email)
        .bind(new.phone.as_deref())
        .fetch_one(&mut *savepoint)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        savepoint.commit().await?;

        row.try_into()
    }

    /// List one page of customers matching `filter`, ascending by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &mut self,
        filter: &CustomerFilter,
        page: PageRequest,
    ) -> Result<Page<Customer>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {CUSTOMER_COLUMNS} FROM crm.customer WHERE TRUE"
        ));

        if let Some(name) = &filter.name_icontains {
            qb.push(" AND name ILIKE ").push_bind(contains_pattern(name));
        }
        if let Some(email) = &filter.email_icontains {
            qb.push(" AND email ILIKE ").push_bind(contains_pattern(email));
        }
        if let Some(prefix) = &filter.phone_starts_with {
            qb.push(" AND phone LIKE ")
                .push_bind(format!("{}%", escape_like(prefix)));
        }
        if let Some(from) = filter.created_at_gte {
            qb.push(" AND created_at >= ").push_bind(from);
        }
        if let Some(to) = filter.created_at_lte {
            qb.push(" AND created_at <= ").push_bind(to);
        }
        if let Some(after) = page.after {
            qb.push(" AND id > ").push_bind(after);
        }
        qb.push(" ORDER BY id LIMIT ").push_bind(page.fetch_limit());

        let rows = qb
            .build_query_as::<CustomerRow>()
            .fetch_all(&mut *self.conn)
            .await?;

        let customers = rows
            .into_iter()
            .map(Customer::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::from_overfetch(customers, page.first))
    }
}
