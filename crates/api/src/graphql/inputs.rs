//! Input objects.

use chrono::{DateTime, Utc};
use juniper::{GraphQLInputObject, ID};
use rust_decimal::Decimal;

use crm_core::{CustomerId, ProductId};

use super::parse_id;
use crate::models::{CreateCustomerInput, CustomerFilter, OrderFilter, ProductFilter};
use crate::services::ValidationError;

/// One customer of a `bulkCreateCustomers` batch.
#[derive(Debug, Clone, GraphQLInputObject)]
pub struct CustomerInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<CustomerInput> for CreateCustomerInput {
    fn from(input: CustomerInput) -> Self {
        Self {
            name: input.name,
            email: input.email,
            phone: input.phone,
        }
    }
}

/// Customer listing criteria; unset fields do not filter.
#[derive(Debug, Clone, Default, GraphQLInputObject)]
pub struct CustomerFilterInput {
    pub name_icontains: Option<String>,
    pub email_icontains: Option<String>,
    pub phone_starts_with: Option<String>,
    pub created_at_gte: Option<DateTime<Utc>>,
    pub created_at_lte: Option<DateTime<Utc>>,
}

impl From<CustomerFilterInput> for CustomerFilter {
    fn from(input: CustomerFilterInput) -> Self {
        Self {
            name_icontains: input.name_icontains,
            email_icontains: input.email_icontains,
            phone_starts_with: input.phone_starts_with,
            created_at_gte: input.created_at_gte,
            created_at_lte: input.created_at_lte,
        }
    }
}

/// Product listing criteria; unset fields do not filter.
#[derive(Debug, Clone, Default, GraphQLInputObject)]
pub struct ProductFilterInput {
    pub name_icontains: Option<String>,
    pub price_gte: Option<Decimal>,
    pub price_lte: Option<Decimal>,
    pub stock_gte: Option<i32>,
    pub stock_lte: Option<i32>,
    /// Stock strictly below this value.
    pub stock_lt: Option<i32>,
}

impl From<ProductFilterInput> for ProductFilter {
    fn from(input: ProductFilterInput) -> Self {
        Self {
            name_icontains: input.name_icontains,
            price_gte: input.price_gte,
            price_lte: input.price_lte,
            stock_gte: input.stock_gte,
            stock_lte: input.stock_lte,
            stock_lt: input.stock_lt,
        }
    }
}

/// Order listing criteria; unset fields do not filter.
#[derive(Debug, Clone, Default, GraphQLInputObject)]
pub struct OrderFilterInput {
    pub customer_id: Option<ID>,
    pub customer_name_icontains: Option<String>,
    /// At least one product's name contains this.
    pub product_name_icontains: Option<String>,
    /// The order includes this product.
    pub product_id: Option<ID>,
    pub total_amount_gte: Option<Decimal>,
    pub total_amount_lte: Option<Decimal>,
    pub order_date_gte: Option<DateTime<Utc>>,
    pub order_date_lte: Option<DateTime<Utc>>,
}

impl TryFrom<OrderFilterInput> for OrderFilter {
    type Error = ValidationError;

    fn try_from(input: OrderFilterInput) -> Result<Self, Self::Error> {
        let customer_id = input
            .customer_id
            .map(|id| parse_id::<CustomerId>(&id).ok_or(ValidationError::InvalidCustomer))
            .transpose()?;
        let product_id = input
            .product_id
            .map(|id| parse_id::<ProductId>(&id).ok_or(ValidationError::InvalidProducts))
            .transpose()?;

        Ok(Self {
            customer_id,
            customer_name_icontains: input.customer_name_icontains,
            product_name_icontains: input.product_name_icontains,
            product_id,
            total_amount_gte: input.total_amount_gte,
            total_amount_lte: input.total_amount_lte,
            order_date_gte: input.order_date_gte,
            order_date_lte: input.order_date_lte,
        })
    }
}
