//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::db::Store;
use crate::graphql::{self, Context, Schema};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    store: Arc<dyn Store>,
    schema: Schema,
}

impl AppState {
    /// Build the state and the GraphQL schema.
    #[must_use]
    pub fn new(config: ApiConfig, store: Arc<dyn Store>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                schema: graphql::schema(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    /// A resolver context for one request.
    #[must_use]
    pub fn graphql_context(&self) -> Context {
        Context::new(Arc::clone(&self.inner.store), self.inner.config.graphql)
    }
}
