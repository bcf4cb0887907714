//! Command handlers and queries.
//!
//! # Services
//!
//! - `customers` - Create one or many customers, customer lookups
//! - `products` - Create products, product lookups
//! - `orders` - Place orders against existing customers and products
//! - `inventory` - Restock products that fell below a threshold
//!
//! Every command runs in a single store transaction and commits only when all
//! of its checks pass.

pub mod customers;
mod error;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod validation;

pub use customers::CustomerService;
pub use error::{ServiceError, ValidationError};
pub use inventory::{DEFAULT_LOW_STOCK_THRESHOLD, InventoryService, RESTOCK_AMOUNT, RestockOutcome};
pub use orders::OrderService;
pub use products::ProductService;
