//! Student answer handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{MISSING_FIELDS, has_fields, object_body, storage_failure, timestamp};
use crate::response;
use crate::server::AppState;
use crate::store::{Document, collections, filter};

const REQUIRED: &[&str] = &["student_id", "question_id", "selected_answer"];

#[derive(Serialize)]
pub struct SubmitAnswerResponse {
    message: &'static str,
    attempt_number: u64,
}

#[derive(Deserialize)]
pub struct AttemptsQuery {
    student_id: Option<String>,
    question_id: Option<String>,
}

#[derive(Serialize)]
pub struct AttemptsResponse {
    attempts: Vec<Document>,
}

/// POST /api/submit-answer
///
/// Stores the answer with a 1-based `attempt_number` counted per
/// (`student_id`, `question_id`) pair.
pub async fn submit_answer(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let mut answer = match object_body(body) {
        Ok(doc) => doc,
        Err(resp) => return resp,
    };
    if !has_fields(&answer, REQUIRED) {
        return response::bad_request(MISSING_FIELDS).into_response();
    }

    let previous = filter([
        ("student_id", answer["student_id"].clone()),
        ("question_id", answer["question_id"].clone()),
    ]);
    let attempt_number = match state
        .store
        .count(collections::STUDENT_ANSWERS, &previous)
        .await
    {
        Ok(n) => n + 1,
        Err(e) => return storage_failure(e),
    };

    answer.insert("submitted_at".to_string(), timestamp());
    answer.insert("attempt_number".to_string(), Value::from(attempt_number));

    match state
        .store
        .insert_one(collections::STUDENT_ANSWERS, answer)
        .await
    {
        Ok(_) => Json(SubmitAnswerResponse {
            message: "Answer submitted",
            attempt_number,
        })
        .into_response(),
        Err(e) => storage_failure(e),
    }
}

/// GET /api/attempts?student_id=&question_id=
pub async fn list_attempts(
    State(state): State<AppState>,
    Query(query): Query<AttemptsQuery>,
) -> Response {
    let (Some(student_id), Some(question_id)) = (
        query.student_id.filter(|v| !v.is_empty()),
        query.question_id.filter(|v| !v.is_empty()),
    ) else {
        return response::bad_request("Missing student_id or question_id").into_response();
    };

    let by = filter([("student_id", student_id), ("question_id", question_id)]);
    match state.store.find(collections::STUDENT_ANSWERS, &by).await {
        Ok(attempts) => Json(AttemptsResponse { attempts }).into_response(),
        Err(e) => storage_failure(e),
    }
}
