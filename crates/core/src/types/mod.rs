//! Domain value types for the CRM.

pub mod email;
pub mod id;
pub mod price;
pub mod stock;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use stock::{Stock, StockError};
