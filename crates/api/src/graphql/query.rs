//! Query root.

use juniper::{ID, graphql_object};

use crm_core::{CustomerId, OrderId, ProductId};

use super::connection::{self, CustomerConnection, OrderConnection, ProductConnection};
use super::inputs::{CustomerFilterInput, OrderFilterInput, ProductFilterInput};
use super::{Context, parse_id};
use crate::models::{Customer, Order, OrderFilter, Product};
use crate::services::{CustomerService, OrderService, ProductService, ServiceError};

/// The query root.
pub struct Query;

#[graphql_object(context = Context)]
impl Query {
    /// A customer by ID, or `null` if there is none.
    async fn customer(ctx: &Context, id: ID) -> Result<Option<Customer>, ServiceError> {
        let Some(id) = parse_id::<CustomerId>(&id) else {
            return Ok(None);
        };
        CustomerService::new(ctx.store()).get(id).await
    }

    /// A product by ID, or `null` if there is none.
    async fn product(ctx: &Context, id: ID) -> Result<Option<Product>, ServiceError> {
        let Some(id) = parse_id::<ProductId>(&id) else {
            return Ok(None);
        };
        ProductService::new(ctx.store()).get(id).await
    }

    /// An order by ID, or `null` if there is none.
    async fn order(ctx: &Context, id: ID) -> Result<Option<Order>, ServiceError> {
        let Some(id) = parse_id::<OrderId>(&id) else {
            return Ok(None);
        };
        OrderService::new(ctx.store()).get(id).await
    }

    /// Customers matching `filter`, ascending by ID.
    async fn all_customers(
        ctx: &Context,
        filter: Option<CustomerFilterInput>,
        first: Option<i32>,
        after: Option<String>,
    ) -> Result<CustomerConnection, ServiceError> {
        let page = connection::page_request(ctx, first, after.as_deref())?;
        let filter = filter.unwrap_or_default().into();
        let customers = CustomerService::new(ctx.store()).list(&filter, page).await?;
        Ok(customers.into())
    }

    /// Products matching `filter`, ascending by ID.
    async fn all_products(
        ctx: &Context,
        filter: Option<ProductFilterInput>,
        first: Option<i32>,
        after: Option<String>,
    ) -> Result<ProductConnection, ServiceError> {
        let page = connection::page_request(ctx, first, after.as_deref())?;
        let filter = filter.unwrap_or_default().into();
        let products = ProductService::new(ctx.store()).list(&filter, page).await?;
        Ok(products.into())
    }

    /// Orders matching `filter`, ascending by ID.
    async fn all_orders(
        ctx: &Context,
        filter: Option<OrderFilterInput>,
        first: Option<i32>,
        after: Option<String>,
    ) -> Result<OrderConnection, ServiceError> {
        let page = connection::page_request(ctx, first, after.as_deref())?;
        let filter = OrderFilter::try_from(filter.unwrap_or_default())?;
        let orders = OrderService::new(ctx.store()).list(&filter, page).await?;
        Ok(orders.into())
    }
}
