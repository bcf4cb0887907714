//! CRM Core - Shared domain types.
//!
//! Used by:
//! - `api` - GraphQL server and command handlers
//! - `cli` - Migrations, seeding and scheduled restocks
//!
//! The core crate holds value types only. Constructors enforce the field-level
//! rules (valid email, positive price, non-negative stock) so the rest of the
//! workspace can only hold values that already passed validation.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, emails, prices and stock levels

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
