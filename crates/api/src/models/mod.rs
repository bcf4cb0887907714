//! Domain models for the CRM.
//!
//! Entities are what the store returns; `New*` types are validated values
//! ready to insert; `*Input` types are the raw arguments a command receives
//! before validation.

pub mod customer;
pub mod order;
pub mod page;
pub mod product;

pub use customer::{BulkCreateOutcome, BulkPolicy, CreateCustomerInput, Customer, CustomerFilter, NewCustomer};
pub use order::{CreateOrderInput, NewOrder, Order, OrderFilter};
pub use page::{Keyed, Page, PageRequest};
pub use product::{CreateProductInput, NewProduct, Product, ProductFilter};
