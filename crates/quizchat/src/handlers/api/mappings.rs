//! LLM mapping records (display persona metadata kept by researchers).

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use super::{MISSING_FIELDS, has_fields, object_body, storage_failure, timestamp};
use crate::response;
use crate::server::AppState;
use crate::store::{Filter, collections, filter};

const REQUIRED: &[&str] = &["llm_id", "display_name", "prompt"];

/// POST /api/llm-mapping
pub async fn create_mapping(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let mut mapping = match object_body(body) {
        Ok(doc) => doc,
        Err(resp) => return resp,
    };
    if !has_fields(&mapping, REQUIRED) {
        return response::bad_request(MISSING_FIELDS).into_response();
    }
    mapping.insert("created_at".to_string(), timestamp());

    match state
        .store
        .insert_one(collections::LLM_MAPPINGS, mapping)
        .await
    {
        Ok(_) => response::message(StatusCode::CREATED, "LLM mapping saved").into_response(),
        Err(e) => storage_failure(e),
    }
}

/// GET /api/llm-mapping
pub async fn list_mappings(State(state): State<AppState>) -> Response {
    match state
        .store
        .find(collections::LLM_MAPPINGS, &Filter::new())
        .await
    {
        Ok(mappings) => Json(mappings).into_response(),
        Err(e) => storage_failure(e),
    }
}

/// DELETE /api/llm-mapping/{llm_id}
pub async fn delete_mapping(
    State(state): State<AppState>,
    Path(llm_id): Path<String>,
) -> Response {
    match state
        .store
        .delete_one(collections::LLM_MAPPINGS, &filter([("llm_id", llm_id)]))
        .await
    {
        Ok(0) => response::not_found("LLM mapping not found").into_response(),
        Ok(_) => response::message(StatusCode::OK, "LLM mapping deleted").into_response(),
        Err(e) => storage_failure(e),
    }
}
