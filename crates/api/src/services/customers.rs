//! Customer commands and queries.

use tracing::{info, instrument};

use crm_core::CustomerId;

use super::{ServiceError, ValidationError, validation};
use crate::db::{RepositoryError, Store, StoreTx};
use crate::models::{
    BulkCreateOutcome, BulkPolicy, CreateCustomerInput, Customer, CustomerFilter, Order,
    OrderFilter, Page, PageRequest,
};

/// Customer service.
pub struct CustomerService<'a> {
    store: &'a dyn Store,
}

impl<'a> CustomerService<'a> {
    /// Create a new customer service.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Create one customer.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmailTaken` if the email is already used, and
    /// field errors for a blank name or malformed email. Nothing is written on
    /// failure.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, input: &CreateCustomerInput) -> Result<Customer, ServiceError> {
        let mut tx = self.store.begin().await?;
        let customer = create_in(tx.as_mut(), input).await?;
        tx.commit().await?;

        info!(customer_id = %customer.id, "Customer created");
        Ok(customer)
    }

    /// Create many customers in one transaction.
    ///
    /// Items are validated in order against the transaction's live state, so
    /// a repeat of an email earlier in the same batch is rejected too.
    /// Rejected items are reported in `errors` and never abort the batch;
    /// `policy` decides whether the accepted items are kept.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` on store failure, in which case
    /// nothing is committed.
    #[instrument(skip(self, inputs), fields(items = inputs.len()))]
    pub async fn bulk_create(
        &self,
        inputs: &[CreateCustomerInput],
        policy: BulkPolicy,
    ) -> Result<BulkCreateOutcome, ServiceError> {
        let mut tx = self.store.begin().await?;
        let mut outcome = BulkCreateOutcome::default();

        for input in inputs {
            match create_in(tx.as_mut(), input).await {
                Ok(customer) => outcome.customers.push(customer),
                Err(ServiceError::Validation(e)) => outcome.errors.push(bulk_error(input, &e)),
                Err(e) => return Err(e),
            }
        }

        if policy == BulkPolicy::AllOrNothing && !outcome.errors.is_empty() {
            info!(
                rejected = outcome.errors.len(),
                "Bulk create rolled back"
            );
            return Ok(BulkCreateOutcome {
                customers: Vec::new(),
                errors: outcome.errors,
            });
        }

        tx.commit().await?;

        info!(
            created = outcome.customers.len(),
            rejected = outcome.errors.len(),
            "Bulk create committed"
        );
        Ok(outcome)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn get(&self, id: CustomerId) -> Result<Option<Customer>, ServiceError> {
        let mut tx = self.store.begin().await?;
        Ok(tx.customer(id).await?)
    }

    /// List one page of customers.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn list(
        &self,
        filter: &CustomerFilter,
        page: PageRequest,
    ) -> Result<Page<Customer>, ServiceError> {
        let mut tx = self.store.begin().await?;
        Ok(tx.customers(filter, page).await?)
    }

    /// Every order placed by a customer, ascending by ID.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn orders(&self, id: CustomerId) -> Result<Vec<Order>, ServiceError> {
        let filter = OrderFilter {
            customer_id: Some(id),
            ..Default::default()
        };
        let mut tx = self.store.begin().await?;
        Ok(tx.orders(&filter, PageRequest::UNBOUNDED).await?.items)
    }
}

/// Validate and insert one customer inside `tx`.
async fn create_in(
    tx: &mut dyn StoreTx,
    input: &CreateCustomerInput,
) -> Result<Customer, ServiceError> {
    let new = validation::new_customer(input)?;

    if tx.email_exists(&new.email).await? {
        return Err(ValidationError::EmailTaken.into());
    }

    // The unique constraint still catches a concurrent insert of the same email.
    match tx.insert_customer(&new).await {
        Err(RepositoryError::Conflict(_)) => Err(ValidationError::EmailTaken.into()),
        result => Ok(result?),
    }
}

/// Error line for a rejected bulk item.
fn bulk_error(input: &CreateCustomerInput, err: &ValidationError) -> String {
    let email = input.email.trim();
    match err {
        ValidationError::EmailTaken => format!("Email {email} already exists"),
        other => format!("{email}: {other}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn input(email: &str) -> CreateCustomerInput {
        CreateCustomerInput::new("Test Customer", email, Some("+1234567890"))
    }

    async fn count(store: &MemoryStore) -> usize {
        CustomerService::new(store)
            .list(&CustomerFilter::default(), PageRequest::UNBOUNDED)
            .await
            .unwrap()
            .items
            .len()
    }

    #[tokio::test]
    async fn test_create_then_get_returns_same_customer() {
        let store = MemoryStore::new();
        let service = CustomerService::new(&store);

        let created = service.create(&input("alice@example.com")).await.unwrap();
        assert_eq!(created.email.as_str(), "alice@example.com");
        assert_eq!(created.phone.as_deref(), Some("+1234567890"));

        let fetched = service.get(created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected_without_write() {
        let store = MemoryStore::new();
        let service = CustomerService::new(&store);
        service.create(&input("alice@example.com")).await.unwrap();

        let err = service.create(&input("alice@example.com")).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::EmailTaken)
        ));
        assert_eq!(err.to_string(), "Email already exists");
        assert_eq!(count(&store).await, 1);
    }

    #[tokio::test]
    async fn test_blank_phone_is_stored_as_absent() {
        let store = MemoryStore::new();
        let service = CustomerService::new(&store);

        let created = service
            .create(&CreateCustomerInput::new("Bob", "bob@example.com", Some("")))
            .await
            .unwrap();
        assert_eq!(created.phone, None);
    }

    #[tokio::test]
    async fn test_bulk_partial_skips_existing_email() {
        let store = MemoryStore::new();
        let service = CustomerService::new(&store);
        service.create(&input("taken@example.com")).await.unwrap();

        let outcome = service
            .bulk_create(
                &[
                    input("one@example.com"),
                    input("taken@example.com"),
                    input("three@example.com"),
                ],
                BulkPolicy::Partial,
            )
            .await
            .unwrap();

        let emails: Vec<&str> = outcome.customers.iter().map(|c| c.email.as_str()).collect();
        assert_eq!(emails, vec!["one@example.com", "three@example.com"]);
        assert_eq!(
            outcome.errors,
            vec!["Email taken@example.com already exists".to_string()]
        );
        assert_eq!(count(&store).await, 3);
    }

    #[tokio::test]
    async fn test_bulk_catches_repeat_within_batch() {
        let store = MemoryStore::new();
        let service = CustomerService::new(&store);

        let outcome = service
            .bulk_create(
                &[input("same@example.com"), input("same@example.com")],
                BulkPolicy::Partial,
            )
            .await
            .unwrap();

        assert_eq!(outcome.customers.len(), 1);
        assert_eq!(
            outcome.errors,
            vec!["Email same@example.com already exists".to_string()]
        );
    }

    #[tokio::test]
    async fn test_bulk_reports_field_errors_with_email() {
        let store = MemoryStore::new();
        let service = CustomerService::new(&store);

        let outcome = service
            .bulk_create(
                &[CreateCustomerInput::new("  ", "blank@example.com", None)],
                BulkPolicy::Partial,
            )
            .await
            .unwrap();

        assert!(outcome.customers.is_empty());
        assert_eq!(
            outcome.errors,
            vec!["blank@example.com: Name cannot be blank".to_string()]
        );
    }

    #[tokio::test]
    async fn test_bulk_all_or_nothing_commits_nothing_on_rejection() {
        let store = MemoryStore::new();
        let service = CustomerService::new(&store);
        service.create(&input("taken@example.com")).await.unwrap();

        let outcome = service
            .bulk_create(
                &[
                    input("one@example.com"),
                    input("taken@example.com"),
                    input("three@example.com"),
                ],
                BulkPolicy::AllOrNothing,
            )
            .await
            .unwrap();

        assert!(outcome.customers.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(count(&store).await, 1);
    }

    #[tokio::test]
    async fn test_bulk_all_or_nothing_commits_clean_batch() {
        let store = MemoryStore::new();
        let service = CustomerService::new(&store);

        let outcome = service
            .bulk_create(
                &[input("one@example.com"), input("two@example.com")],
                BulkPolicy::AllOrNothing,
            )
            .await
            .unwrap();

        assert_eq!(outcome.customers.len(), 2);
        assert!(outcome.errors.is_empty());
        assert_eq!(count(&store).await, 2);
    }
}
