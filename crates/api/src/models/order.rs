//! Order domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crm_core::{CustomerId, OrderId, ProductId};

use super::customer::{Customer, contains_ci};
use super::page::Keyed;
use super::product::Product;

/// A stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Customer who placed the order.
    pub customer_id: CustomerId,
    /// Linked products, ascending and without repeats.
    pub product_ids: Vec<ProductId>,
    /// Sum of the linked products' prices when the order was placed.
    pub total_amount: Decimal,
    pub order_date: DateTime<Utc>,
}

impl Keyed for Order {
    fn key(&self) -> i32 {
        self.id.as_i32()
    }
}

/// A validated order ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    /// Distinct product IDs that all exist.
    pub product_ids: Vec<ProductId>,
    pub total_amount: Decimal,
}

/// Arguments of `createOrder`, as the client sent them.
///
/// IDs stay raw strings so a malformed ID is reported by the same rule as an
/// unknown one, in the same order the checks run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOrderInput {
    pub customer_id: String,
    /// May contain repeats; they are collapsed before validation.
    pub product_ids: Vec<String>,
}

impl CreateOrderInput {
    /// Build an input from typed IDs.
    #[must_use]
    pub fn new(customer_id: CustomerId, product_ids: &[ProductId]) -> Self {
        Self {
            customer_id: customer_id.to_string(),
            product_ids: product_ids.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Criteria for listing orders. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderFilter {
    pub customer_id: Option<CustomerId>,
    pub customer_name_icontains: Option<String>,
    /// Matches orders with at least one product whose name contains this.
    pub product_name_icontains: Option<String>,
    /// Matches orders that include this product.
    pub product_id: Option<ProductId>,
    pub total_amount_gte: Option<Decimal>,
    pub total_amount_lte: Option<Decimal>,
    pub order_date_gte: Option<DateTime<Utc>>,
    pub order_date_lte: Option<DateTime<Utc>>,
}

impl OrderFilter {
    /// Whether `order`, placed by `customer` and linking `products`, satisfies
    /// every set criterion.
    #[must_use]
    pub fn matches(&self, order: &Order, customer: &Customer, products: &[&Product]) -> bool {
        self.customer_id.is_none_or(|id| order.customer_id == id)
            && contains_ci(self.customer_name_icontains.as_deref(), &customer.name)
            && self.product_name_icontains.as_deref().is_none_or(|needle| {
                products
                    .iter()
                    .any(|p| contains_ci(Some(needle), &p.name))
            })
            && self
                .product_id
                .is_none_or(|id| order.product_ids.contains(&id))
            && self
                .total_amount_gte
                .is_none_or(|min| order.total_amount >= min)
            && self
                .total_amount_lte
                .is_none_or(|max| order.total_amount <= max)
            && self.order_date_gte.is_none_or(|from| order.order_date >= from)
            && self.order_date_lte.is_none_or(|to| order.order_date <= to)
    }
}
