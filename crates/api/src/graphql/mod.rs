//! GraphQL schema.
//!
//! # Modules
//!
//! - `query` - Lookups by ID and paginated listings
//! - `mutation` - Commands
//! - `objects` - Object resolvers for customers, products and orders
//! - `inputs` - Argument and filter input objects
//! - `connection` - Cursor connections
//! - `error` - Mapping of service errors to field errors

mod connection;
mod error;
mod inputs;
mod mutation;
mod objects;
mod query;

use std::sync::Arc;

use juniper::{EmptySubscription, RootNode};

use crate::db::Store;
use crate::models::BulkPolicy;

pub use connection::{CustomerConnection, OrderConnection, PageInfo, ProductConnection};
pub use inputs::{CustomerFilterInput, CustomerInput, OrderFilterInput, ProductFilterInput};
pub use mutation::Mutation;
pub use query::Query;

/// Type of the API root node.
pub type Schema = RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

/// Build the API root node.
#[must_use]
pub fn schema() -> Schema {
    Schema::new(Query, Mutation, EmptySubscription::new())
}

/// Request-independent settings the resolvers need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphqlSettings {
    /// Policy for `bulkCreateCustomers` when the caller passes none.
    pub bulk_policy: BulkPolicy,
    /// Page size when `first` is omitted.
    pub default_page_size: usize,
    /// Largest page size a caller can ask for.
    pub max_page_size: usize,
}

impl Default for GraphqlSettings {
    fn default() -> Self {
        Self {
            bulk_policy: BulkPolicy::Partial,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// The context that is accessible to every resolver.
#[derive(Clone)]
pub struct Context {
    store: Arc<dyn Store>,
    settings: GraphqlSettings,
}

impl Context {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, settings: GraphqlSettings) -> Self {
        Self { store, settings }
    }

    pub(crate) fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub(crate) const fn settings(&self) -> &GraphqlSettings {
        &self.settings
    }
}

impl juniper::Context for Context {}

/// Parse a GraphQL `ID` into a typed ID, `None` if malformed.
pub(crate) fn parse_id<T: std::str::FromStr>(id: &juniper::ID) -> Option<T> {
    id.parse().ok()
}

/// Render a typed ID as a GraphQL `ID`.
pub(crate) fn to_id(id: impl std::fmt::Display) -> juniper::ID {
    juniper::ID::new(id.to_string())
}
