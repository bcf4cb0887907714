//! Mutation root and payloads.

use juniper::{GraphQLObject, ID, graphql_object};
use rust_decimal::Decimal;

use super::Context;
use super::inputs::CustomerInput;
use crate::models::{
    BulkPolicy, CreateCustomerInput, CreateOrderInput, CreateProductInput, Customer, Order,
    Product,
};
use crate::services::{
    CustomerService, InventoryService, OrderService, ProductService, ServiceError,
};

#[derive(Debug, Clone, GraphQLObject)]
#[graphql(context = Context)]
pub struct CreateCustomerPayload {
    pub customer: Customer,
    pub message: String,
}

#[derive(Debug, Clone, GraphQLObject)]
#[graphql(context = Context)]
pub struct BulkCreateCustomersPayload {
    /// Created customers, in input order.
    pub customers: Vec<Customer>,
    /// One message per rejected item, in input order.
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, GraphQLObject)]
#[graphql(context = Context)]
pub struct CreateProductPayload {
    pub product: Product,
}

#[derive(Debug, Clone, GraphQLObject)]
#[graphql(context = Context)]
pub struct CreateOrderPayload {
    pub order: Order,
}

#[derive(Debug, Clone, GraphQLObject)]
#[graphql(context = Context)]
pub struct UpdateLowStockProductsPayload {
    /// Products after restocking, ascending by ID.
    pub updated_products: Vec<Product>,
    pub message: String,
}

/// The mutation root.
pub struct Mutation;

#[graphql_object(context = Context)]
impl Mutation {
    /// Create a customer. Fails if the email is already used.
    async fn create_customer(
        ctx: &Context,
        name: String,
        email: String,
        phone: Option<String>,
    ) -> Result<CreateCustomerPayload, ServiceError> {
        let input = CreateCustomerInput { name, email, phone };
        let customer = CustomerService::new(ctx.store()).create(&input).await?;
        Ok(CreateCustomerPayload {
            customer,
            message: "Customer created successfully.".to_owned(),
        })
    }

    /// Create many customers at once.
    ///
    /// Rejected items are listed in `errors`. With `PARTIAL` the other items
    /// are kept; with `ALL_OR_NOTHING` nothing is kept if any item failed.
    async fn bulk_create_customers(
        ctx: &Context,
        input: Vec<CustomerInput>,
        policy: Option<BulkPolicy>,
    ) -> Result<BulkCreateCustomersPayload, ServiceError> {
        let inputs: Vec<CreateCustomerInput> = input.into_iter().map(Into::into).collect();
        let policy = policy.unwrap_or(ctx.settings().bulk_policy);
        let outcome = CustomerService::new(ctx.store())
            .bulk_create(&inputs, policy)
            .await?;
        Ok(BulkCreateCustomersPayload {
            customers: outcome.customers,
            errors: outcome.errors,
        })
    }

    /// Create a product.
    async fn create_product(
        ctx: &Context,
        name: String,
        price: Decimal,
        #[graphql(default = 0)] stock: i32,
    ) -> Result<CreateProductPayload, ServiceError> {
        let input = CreateProductInput { name, price, stock };
        let product = ProductService::new(ctx.store()).create(&input).await?;
        Ok(CreateProductPayload { product })
    }

    /// Place an order. Repeated product IDs are charged once.
    async fn create_order(
        ctx: &Context,
        customer_id: ID,
        product_ids: Vec<ID>,
    ) -> Result<CreateOrderPayload, ServiceError> {
        let input = CreateOrderInput {
            customer_id: (*customer_id).to_owned(),
            product_ids: product_ids.iter().map(|id| (**id).to_owned()).collect(),
        };
        let order = OrderService::new(ctx.store()).create(&input).await?;
        Ok(CreateOrderPayload { order })
    }

    /// Add 10 units to every product with stock below `threshold`.
    async fn update_low_stock_products(
        ctx: &Context,
        #[graphql(default = 10)] threshold: i32,
    ) -> Result<UpdateLowStockProductsPayload, ServiceError> {
        let outcome = InventoryService::new(ctx.store())
            .restock_low_stock(threshold)
            .await?;
        Ok(UpdateLowStockProductsPayload {
            updated_products: outcome.updated_products,
            message: outcome.message,
        })
    }
}
