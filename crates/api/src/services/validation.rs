//! Input checks that need no store access.
//!
//! Each function turns raw command arguments into values the store accepts.
//! Checks that depend on stored data (duplicate email, referenced IDs) live in
//! the services.

use crm_core::{Email, Price, ProductId, Stock};

use super::ValidationError;
use crate::models::{CreateCustomerInput, CreateProductInput, NewCustomer, NewProduct, PageRequest};

/// Trim a name and reject it if nothing is left.
///
/// # Errors
///
/// Returns [`ValidationError::BlankName`] for empty or whitespace-only names.
pub fn name(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankName);
    }
    Ok(trimmed.to_owned())
}

/// Trim a phone number; a blank one counts as absent.
#[must_use]
pub fn phone(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
}

/// Validate the fields of a customer.
///
/// # Errors
///
/// Returns [`ValidationError::BlankName`] or [`ValidationError::InvalidEmail`].
pub fn new_customer(input: &CreateCustomerInput) -> Result<NewCustomer, ValidationError> {
    Ok(NewCustomer {
        name: name(&input.name)?,
        email: Email::parse(&input.email)?,
        phone: phone(input.phone.as_deref()),
    })
}

/// Validate the fields of a product. Price is checked before stock.
///
/// # Errors
///
/// Returns the first failing rule: blank name, then price, then stock.
pub fn new_product(input: &CreateProductInput) -> Result<NewProduct, ValidationError> {
    let name = name(&input.name)?;
    let price = Price::new(input.price)?;
    let stock = Stock::new(input.stock)?;
    Ok(NewProduct { name, price, stock })
}

/// Parse product IDs and drop repeats, keeping first-occurrence order.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidProducts`] if any ID is malformed.
pub fn distinct_product_ids(raw: &[String]) -> Result<Vec<ProductId>, ValidationError> {
    let mut ids: Vec<ProductId> = Vec::with_capacity(raw.len());
    for value in raw {
        let id = value
            .parse::<ProductId>()
            .map_err(|_| ValidationError::InvalidProducts)?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Resolve the requested page size against the configured default and cap.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidPageSize`] if `first` is zero or negative.
pub fn page_request(
    first: Option<i32>,
    after: Option<i32>,
    default_size: usize,
    max_size: usize,
) -> Result<PageRequest, ValidationError> {
    let size = match first {
        None => default_size,
        Some(n) if n <= 0 => return Err(ValidationError::InvalidPageSize),
        Some(n) => usize::try_from(n).map_err(|_| ValidationError::InvalidPageSize)?,
    };
    Ok(PageRequest::new(size.clamp(1, max_size.max(1)), after))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crm_core::{PriceError, StockError};

    fn product_input(price: Decimal, stock: i32) -> CreateProductInput {
        CreateProductInput {
            name: "Widget".to_string(),
            price,
            stock,
        }
    }

    #[test]
    fn test_name_is_trimmed() {
        assert_eq!(name("  Alice ").unwrap(), "Alice");
        assert_eq!(name("   "), Err(ValidationError::BlankName));
    }

    #[test]
    fn test_blank_phone_is_absent() {
        assert_eq!(phone(Some("  ")), None);
        assert_eq!(phone(None), None);
        assert_eq!(phone(Some(" +1234 ")), Some("+1234".to_string()));
    }

    #[test]
    fn test_new_customer_rejects_bad_email() {
        let input = CreateCustomerInput::new("Alice", "not-an-email", None);
        assert!(matches!(
            new_customer(&input),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_price_checked_before_stock() {
        let err = new_product(&product_input(Decimal::ZERO, -1)).unwrap_err();
        assert_eq!(err, ValidationError::Price(PriceError::NotPositive));

        let err = new_product(&product_input(Decimal::ONE, -1)).unwrap_err();
        assert_eq!(err, ValidationError::Stock(StockError::Negative));
    }

    #[test]
    fn test_distinct_product_ids_keeps_first_occurrence() {
        let raw = ["3", "1", "3", " 2 "].map(String::from);
        let ids = distinct_product_ids(&raw).unwrap();
        assert_eq!(
            ids,
            vec![ProductId::new(3), ProductId::new(1), ProductId::new(2)]
        );
    }

    #[test]
    fn test_malformed_product_id_is_invalid() {
        let raw = ["1", "abc"].map(String::from);
        assert_eq!(
            distinct_product_ids(&raw),
            Err(ValidationError::InvalidProducts)
        );
    }

    #[test]
    fn test_page_request() {
        assert_eq!(page_request(None, None, 20, 100).unwrap().first, 20);
        assert_eq!(page_request(Some(500), None, 20, 100).unwrap().first, 100);
        assert_eq!(page_request(Some(5), Some(9), 20, 100).unwrap().after, Some(9));
        assert_eq!(
            page_request(Some(0), None, 20, 100),
            Err(ValidationError::InvalidPageSize)
        );
        assert_eq!(
            page_request(Some(-3), None, 20, 100),
            Err(ValidationError::InvalidPageSize)
        );
    }
}
