//! Command and query error types.

use thiserror::Error;

use crm_core::{EmailError, PriceError, StockError};

use crate::db::RepositoryError;

/// A business rule rejected the input. The message is shown to clients as is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Another customer already uses this email.
    #[error("Email already exists")]
    EmailTaken,

    /// Email is not structurally valid.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Name is empty or whitespace.
    #[error("Name cannot be blank")]
    BlankName,

    #[error(transparent)]
    Price(#[from] PriceError),

    #[error(transparent)]
    Stock(#[from] StockError),

    /// Order references a customer that does not exist.
    #[error("Invalid customer ID")]
    InvalidCustomer,

    /// Order lists no products.
    #[error("At least one product must be selected")]
    NoProducts,

    /// Order references at least one product that does not exist.
    #[error("One or more product IDs are invalid")]
    InvalidProducts,

    /// Requested page size is zero or negative.
    #[error("Page size must be positive")]
    InvalidPageSize,

    /// Pagination cursor could not be decoded.
    #[error("Invalid cursor")]
    InvalidCursor,
}

/// Errors returned by the command handlers and queries.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Store failure; details are logged, never shown to clients.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(ValidationError::EmailTaken.to_string(), "Email already exists");
        assert_eq!(
            ValidationError::from(PriceError::NotPositive).to_string(),
            "Price must be positive"
        );
        assert_eq!(
            ValidationError::from(StockError::Negative).to_string(),
            "Stock cannot be negative"
        );
        assert_eq!(
            ValidationError::NoProducts.to_string(),
            "At least one product must be selected"
        );
    }

    #[test]
    fn test_validation_passes_through_service_error() {
        let err = ServiceError::from(ValidationError::InvalidCustomer);
        assert_eq!(err.to_string(), "Invalid customer ID");
    }
}
