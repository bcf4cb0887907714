//! Sample data for local development.
//!
//! Customers are inserted with the partial bulk policy, so running the seed
//! twice only reports the duplicate emails. Products and the sample order are
//! skipped once any product exists.

use rust_decimal::Decimal;

use crm_api::models::{
    BulkPolicy, CreateCustomerInput, CreateOrderInput, CreateProductInput, PageRequest,
    ProductFilter,
};
use crm_api::services::{CustomerService, OrderService, ProductService};

use super::{CliError, connect};

const CUSTOMERS: &[(&str, &str, Option<&str>)] = &[
    ("Alice Johnson", "alice@example.com", Some("+1234567890")),
    ("Bob Smith", "bob@example.com", Some("+1-555-0100")),
    ("Carol White", "carol@example.com", None),
];

/// Name, price in cents, stock.
const PRODUCTS: &[(&str, i64, i32)] = &[
    ("Laptop", 99_999, 5),
    ("Mouse", 2_499, 40),
    ("Keyboard", 7_950, 12),
    ("Monitor", 24_900, 3),
];

/// Insert the sample data.
pub async fn run() -> Result<(), CliError> {
    let store = connect().await?;

    let inputs: Vec<CreateCustomerInput> = CUSTOMERS
        .iter()
        .map(|&(name, email, phone)| CreateCustomerInput {
            name: name.to_owned(),
            email: email.to_owned(),
            phone: phone.map(str::to_owned),
        })
        .collect();
    let outcome = CustomerService::new(&store)
        .bulk_create(&inputs, BulkPolicy::Partial)
        .await?;
    tracing::info!(created = outcome.customers.len(), "Seeded customers");
    for err in &outcome.errors {
        tracing::warn!("Skipped customer: {err}");
    }

    let products = ProductService::new(&store);
    let existing = products
        .list(&ProductFilter::default(), PageRequest::new(1, None))
        .await?;
    if !existing.items.is_empty() {
        tracing::info!("Products already present, skipping products and orders");
        return Ok(());
    }

    let mut created = Vec::with_capacity(PRODUCTS.len());
    for &(name, cents, stock) in PRODUCTS {
        let input = CreateProductInput {
            name: name.to_owned(),
            price: Decimal::new(cents, 2),
            stock,
        };
        created.push(products.create(&input).await?);
    }
    tracing::info!(created = created.len(), "Seeded products");

    if let (Some(customer), [laptop, mouse, ..]) = (outcome.customers.first(), created.as_slice()) {
        let order = OrderService::new(&store)
            .create(&CreateOrderInput::new(customer.id, &[laptop.id, mouse.id]))
            .await?;
        tracing::info!(order_id = %order.id, total = %order.total_amount, "Seeded order");
    }

    Ok(())
}
