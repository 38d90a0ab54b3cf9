use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;

use crate::api::ApiError;
use crate::models::{AskParams, AskRequest, AskResponse};
use crate::state::AppState;

/// POST /ask - Answer a question against the current index.
///
/// The question comes from `?query=` or from a JSON body
/// `{"query": ..., "history": [{"query", "response"}, ...]}`; the query
/// string wins when both are present.
pub async fn ask(
    State(state): State<AppState>,
    Query(params): Query<AskParams>,
    body: Bytes,
) -> Result<Json<AskResponse>, ApiError> {
    let request = parse_body(&body)?;
    let query = params
        .query
        .or(request.query)
        .map(|q| q.trim().to_string())
        .unwrap_or_default();
    if query.is_empty() {
        return Err(ApiError::bad_request("Query is required"));
    }

    // Only hold the workspace lock while resolving the index; generation
    // can take minutes and works on the in-memory copy.
    let index = {
        let _guard = state.workspace_lock.lock().await;
        state.index().await
    }
    .map_err(|e| ApiError::internal(format!("{e:#}")))?;

    let answer = crate::rag::answer_from_index(
        &state.http_client,
        &state.config,
        &index,
        &query,
        &request.history,
    )
    .await
    .map_err(|e| {
        tracing::error!("Question failed: {e:#}");
        ApiError::internal(format!("{e:#}"))
    })?;

    Ok(Json(AskResponse { answer }))
}

fn parse_body(body: &[u8]) -> Result<AskRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(AskRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request("Invalid JSON body").with_details(e.to_string()))
}
