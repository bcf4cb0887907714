//! Product domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crm_core::{Price, ProductId, Stock};

use super::customer::contains_ci;
use super::page::Keyed;

/// A stored product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price, always positive.
    pub price: Price,
    /// Units on hand, never negative.
    pub stock: Stock,
}

impl Keyed for Product {
    fn key(&self) -> i32 {
        self.id.as_i32()
    }
}

/// A validated product ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub stock: Stock,
}

/// Arguments of `createProduct`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub price: Decimal,
    /// Defaults to zero when omitted.
    #[serde(default)]
    pub stock: i32,
}

/// Criteria for listing products. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductFilter {
    pub name_icontains: Option<String>,
    pub price_gte: Option<Decimal>,
    pub price_lte: Option<Decimal>,
    pub stock_gte: Option<i32>,
    pub stock_lte: Option<i32>,
    /// Low-stock filter: stock strictly below this value.
    pub stock_lt: Option<i32>,
}

impl ProductFilter {
    /// Whether `product` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let price = product.price.amount();
        let stock = product.stock.units();
        contains_ci(self.name_icontains.as_deref(), &product.name)
            && self.price_gte.is_none_or(|min| price >= min)
            && self.price_lte.is_none_or(|max| price <= max)
            && self.stock_gte.is_none_or(|min| stock >= min)
            && self.stock_lte.is_none_or(|max| stock <= max)
            && self.stock_lt.is_none_or(|limit| stock < limit)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(price: &str, stock: i32) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Laptop Stand".to_string(),
            price: Price::new(price.parse().unwrap()).unwrap(),
            stock: Stock::new(stock).unwrap(),
        }
    }

    #[test]
    fn test_price_range() {
        let p = product("49.99", 3);
        let filter = ProductFilter {
            price_gte: Some("40".parse().unwrap()),
            price_lte: Some("49.99".parse().unwrap()),
            ..Default::default()
        };
        assert!(filter.matches(&p));

        let too_cheap = ProductFilter {
            price_gte: Some("50".parse().unwrap()),
            ..Default::default()
        };
        assert!(!too_cheap.matches(&p));
    }

    #[test]
    fn test_stock_lt_is_strict() {
        let p = product("10", 5);
        let at = ProductFilter {
            stock_lt: Some(5),
            ..Default::default()
        };
        let above = ProductFilter {
            stock_lt: Some(6),
            ..Default::default()
        };
        assert!(!at.matches(&p));
        assert!(above.matches(&p));
    }
}
