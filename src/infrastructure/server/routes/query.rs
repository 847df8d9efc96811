use super::super::dto::{RestQueryRequest, RestQueryResponse};
use super::super::state::ServerState;
use crate::application::bridge::{QueryOutcome, QueryRequest};
use crate::infrastructure::model::ModelProvider;
use axum::Json;
use axum::extract::State;
use std::sync::Arc;
use tracing::{info, warn};

#[utoipa::path(
    post,
    path = "/api/query",
    tag = "query",
    request_body = RestQueryRequest,
    responses(
        (status = 200, description = "Answer, or the failure reported as data", body = RestQueryResponse)
    )
)]
pub async fn query_handler<P: ModelProvider>(
    State(state): State<Arc<ServerState<P>>>,
    Json(payload): Json<RestQueryRequest>,
) -> Json<RestQueryResponse> {
    let RestQueryRequest {
        query,
        model,
        temperature,
    } = payload;

    info!(
        model = model.as_deref(),
        temperature,
        "Received /api/query request"
    );

    if query.trim().is_empty() {
        warn!("Rejecting /api/query request due to empty query");
        return Json(QueryOutcome::failed("query cannot be empty".to_string()).into());
    }

    let outcome = state
        .bridge()
        .query_outcome(QueryRequest {
            query,
            model,
            temperature,
        })
        .await;
    Json(outcome.into())
}
