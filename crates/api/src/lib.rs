//! CRM GraphQL API library.
//!
//! Customers, products and orders behind a single GraphQL endpoint. The
//! binary in `main.rs` wires configuration, logging and the store together;
//! everything else lives here so it can be tested without a server.
//!
//! # Layers
//!
//! - [`graphql`] - schema, resolvers and error mapping
//! - [`services`] - validation and business rules
//! - [`db`] - the [`db::Store`] trait with `PostgreSQL` and in-memory backends
//! - [`routes`] - HTTP routes and the application router

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod graphql;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
