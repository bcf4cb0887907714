//! HTTP routes and the application router.
//!
//! # Routes
//!
//! - `GET|POST /graphql` - GraphQL endpoint
//! - `GET /graphiql` - GraphiQL explorer (when enabled)
//! - `GET /health` - liveness
//! - `GET /health/ready` - readiness (checks the store)

mod graphql;
mod health;

use axum::{Router, routing::get};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Build the route table.
#[must_use]
pub fn routes(graphiql: bool) -> Router<AppState> {
    let router = Router::new()
        .route("/graphql", get(graphql::handler).post(graphql::handler))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness));

    if graphiql {
        router.route("/graphiql", get(juniper_axum::graphiql("/graphql", None::<&str>)))
    } else {
        router
    }
}

/// Build the complete application: routes, request IDs, tracing and Sentry.
#[must_use]
pub fn app(state: AppState) -> Router {
    let graphiql = state.config().graphiql;

    routes(graphiql)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
