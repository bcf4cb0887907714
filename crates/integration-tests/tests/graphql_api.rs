//! End-to-end tests over HTTP against the memory store.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use crm_api::middleware::REQUEST_ID_HEADER;
use crm_integration_tests::TestServer;

#[tokio::test]
async fn test_health_and_request_id() {
    let server = TestServer::spawn().await;

    let resp = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key(REQUEST_ID_HEADER));
    assert_eq!(resp.text().await.unwrap(), "ok");

    let resp = server
        .client
        .get(server.url("/health/ready"))
        .header(REQUEST_ID_HEADER, "probe-1")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[REQUEST_ID_HEADER], "probe-1");
}

#[tokio::test]
async fn test_graphiql_can_be_disabled() {
    let server = TestServer::spawn().await;
    let resp = server.client.get(server.url("/graphiql")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let server = TestServer::spawn_with(
        &[("CRM_GRAPHIQL", "false")],
        std::sync::Arc::new(crm_api::db::MemoryStore::new()),
    )
    .await;
    let resp = server.client.get(server.url("/graphiql")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_request_runs_queries() {
    let server = TestServer::spawn().await;

    let body: Value = server
        .client
        .get(server.url("/graphql"))
        .query(&[("query", "{ allProducts { edges { cursor } } }")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"data": {"allProducts": {"edges": []}}}));
}

#[tokio::test]
async fn test_order_flow() {
    let server = TestServer::spawn().await;

    let body = server
        .graphql_with(
            "mutation ($name: String!, $email: String!) { \
                createCustomer(name: $name, email: $email) { customer { id } message } }",
            json!({"name": "Alice", "email": "alice@example.com"}),
        )
        .await;
    let customer_id = body["data"]["createCustomer"]["customer"]["id"].clone();
    assert_eq!(customer_id, "1");

    server
        .graphql(
            r#"mutation {
                a: createProduct(name: "Laptop", price: "999.99", stock: 2) { product { id } }
                b: createProduct(name: "Mouse", price: "0.01", stock: 20) { product { id } }
            }"#,
        )
        .await;

    let body = server
        .graphql_with(
            "mutation ($customer: ID!, $products: [ID!]!) { \
                createOrder(customerId: $customer, productIds: $products) { \
                    order { id totalAmount customer { name } products { name } } } }",
            json!({"customer": customer_id, "products": ["1", "2"]}),
        )
        .await;
    assert_eq!(
        body["data"]["createOrder"]["order"],
        json!({
            "id": "1",
            "totalAmount": "1000.00",
            "customer": {"name": "Alice"},
            "products": [{"name": "Laptop"}, {"name": "Mouse"}]
        })
    );

    let body = server
        .graphql("mutation { updateLowStockProducts { updatedProducts { name stock } message } }")
        .await;
    assert_eq!(
        body["data"]["updateLowStockProducts"],
        json!({
            "updatedProducts": [{"name": "Laptop", "stock": 12}],
            "message": "Updated 1 low-stock products (threshold: 10)."
        })
    );
}

#[tokio::test]
async fn test_validation_errors_carry_code() {
    let server = TestServer::spawn().await;

    let body = server
        .graphql(r#"mutation { createCustomer(name: "  ", email: "x@example.com") { message } }"#)
        .await;
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["errors"][0]["message"], "Name cannot be blank");
    assert_eq!(body["errors"][0]["extensions"]["code"], "VALIDATION_ERROR");

    let body = server
        .graphql(r#"mutation { createOrder(customerId: "abc", productIds: ["1"]) { order { id } } }"#)
        .await;
    assert_eq!(body["errors"][0]["message"], "Invalid customer ID");
}

#[tokio::test]
async fn test_bulk_policy_default_from_config() {
    let server = TestServer::spawn_with(
        &[("CRM_BULK_POLICY", "all_or_nothing")],
        std::sync::Arc::new(crm_api::db::MemoryStore::new()),
    )
    .await;

    let body = server
        .graphql(
            r#"mutation { bulkCreateCustomers(input: [
                {name: "One", email: "one@example.com"},
                {name: "Bad", email: "not-an-email"}
            ]) { customers { email } errors } }"#,
        )
        .await;
    let payload = &body["data"]["bulkCreateCustomers"];
    assert_eq!(payload["customers"], json!([]));
    assert_eq!(payload["errors"].as_array().map(Vec::len), Some(1));

    let body = server
        .graphql("{ allCustomers { edges { node { email } } } }")
        .await;
    assert_eq!(body["data"]["allCustomers"]["edges"], json!([]));
}
