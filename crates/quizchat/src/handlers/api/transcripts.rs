//! Chat transcript handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use super::{MISSING_FIELDS, has_fields, object_body, storage_failure};
use crate::response;
use crate::server::AppState;
use crate::store::{Document, collections};

const REQUIRED: &[&str] = &["student_id", "question_id", "llm_used", "chat"];

/// POST /api/save-chat
///
/// `chat` must be a non-empty array of turns; the first and last turns'
/// `timestamp` become `session_start` and `session_end`.
pub async fn save_chat(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let mut body = match object_body(body) {
        Ok(doc) => doc,
        Err(resp) => return resp,
    };
    if !has_fields(&body, REQUIRED) {
        return response::bad_request(MISSING_FIELDS).into_response();
    }

    let turns = match body.remove("chat") {
        Some(Value::Array(turns)) if !turns.is_empty() => turns,
        _ => return response::bad_request("'chat' must be a non-empty array").into_response(),
    };
    let turn_time = |turn: Option<&Value>| {
        turn.and_then(|t| t.get("timestamp"))
            .cloned()
            .unwrap_or(Value::Null)
    };
    let session_start = turn_time(turns.first());
    let session_end = turn_time(turns.last());

    let mut transcript = Document::new();
    for field in ["student_id", "question_id", "llm_used"] {
        if let Some(value) = body.remove(field) {
            transcript.insert(field.to_string(), value);
        }
    }
    transcript.insert("chat".to_string(), Value::Array(turns));
    transcript.insert("session_start".to_string(), session_start);
    transcript.insert("session_end".to_string(), session_end);

    match state
        .store
        .insert_one(collections::CHAT_HISTORY, transcript)
        .await
    {
        Ok(_) => response::message(StatusCode::OK, "Chat saved").into_response(),
        Err(e) => storage_failure(e),
    }
}
