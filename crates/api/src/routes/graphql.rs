//! GraphQL over HTTP.

use axum::extract::State;
use juniper_axum::{extract::JuniperRequest, response::JuniperResponse};

use crate::state::AppState;

/// Execute a GraphQL request (or batch) against the schema.
///
/// Accepts `GET` with query parameters and `POST` with a JSON body.
pub async fn handler(
    State(state): State<AppState>,
    JuniperRequest(request): JuniperRequest,
) -> JuniperResponse {
    let ctx = state.graphql_context();
    JuniperResponse(request.execute(state.schema(), &ctx).await)
}
