//! Integration tests for the CRM API.
//!
//! # Running Tests
//!
//! ```bash
//! # HTTP tests against an in-process server with the memory store
//! cargo test -p crm-integration-tests
//!
//! # Store tests against a real database (migrations are applied)
//! CRM_TEST_DATABASE_URL=postgres://localhost/crm_test \
//!     cargo test -p crm-integration-tests -- --ignored
//! ```

use std::sync::Arc;

use reqwest::Client;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crm_api::config::ApiConfig;
use crm_api::db::{MemoryStore, Store};
use crm_api::routes;
use crm_api::state::AppState;

/// A server running on an ephemeral port for the duration of a test.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Serve the full application over a fresh memory store.
    pub async fn spawn() -> Self {
        Self::spawn_with(&[], Arc::new(MemoryStore::new())).await
    }

    /// Serve the application with extra environment settings.
    pub async fn spawn_with(vars: &[(&str, &str)], store: Arc<dyn Store>) -> Self {
        let config = ApiConfig::from_lookup(|key| {
            if key == "CRM_STORE" {
                return Some("memory".to_string());
            }
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        })
        .expect("Test configuration should be valid");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let app = routes::app(AppState::new(config, store));
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        Self {
            base_url: format!("http://{addr}"),
            client: Client::new(),
            handle,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// POST a GraphQL document and return the decoded response body.
    pub async fn graphql(&self, query: &str) -> Value {
        self.graphql_with(query, Value::Null).await
    }

    pub async fn graphql_with(&self, query: &str, variables: Value) -> Value {
        self.client
            .post(self.url("/graphql"))
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .expect("GraphQL request failed")
            .json()
            .await
            .expect("GraphQL response was not JSON")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
