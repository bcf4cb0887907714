//! Object resolvers for the stored entities.

use chrono::{DateTime, Utc};
use juniper::{ID, graphql_object};
use rust_decimal::Decimal;

use super::{Context, to_id};
use crate::db::RepositoryError;
use crate::models::{Customer, Order, Product};
use crate::services::{CustomerService, ProductService, ServiceError};

/// A customer.
#[graphql_object(context = Context)]
impl Customer {
    fn id(&self) -> ID {
        to_id(self.id)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn email(&self) -> &str {
        self.email.as_str()
    }

    fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Orders placed by this customer, ascending by ID.
    async fn orders(&self, ctx: &Context) -> Result<Vec<Order>, ServiceError> {
        CustomerService::new(ctx.store()).orders(self.id).await
    }
}

/// A product.
#[graphql_object(context = Context)]
impl Product {
    fn id(&self) -> ID {
        to_id(self.id)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn price(&self) -> Decimal {
        self.price.amount()
    }

    fn stock(&self) -> i32 {
        self.stock.units()
    }
}

/// An order placed by one customer for one or more products.
#[graphql_object(context = Context)]
impl Order {
    fn id(&self) -> ID {
        to_id(self.id)
    }

    /// Sum of the product prices when the order was placed.
    fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    fn order_date(&self) -> DateTime<Utc> {
        self.order_date
    }

    async fn customer(&self, ctx: &Context) -> Result<Customer, ServiceError> {
        CustomerService::new(ctx.store())
            .get(self.customer_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound.into())
    }

    /// Linked products, ascending by ID.
    async fn products(&self, ctx: &Context) -> Result<Vec<Product>, ServiceError> {
        ProductService::new(ctx.store())
            .get_many(&self.product_ids)
            .await
    }
}
