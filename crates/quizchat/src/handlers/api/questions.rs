//! Question bank handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::Value;

use super::{MISSING_FIELDS, has_fields, object_body, storage_failure, timestamp};
use crate::response;
use crate::server::AppState;
use crate::store::{Filter, collections, filter};

const REQUIRED: &[&str] = &[
    "section",
    "difficulty",
    "question_text",
    "options",
    "correct_answer",
];

#[derive(Deserialize)]
pub struct QuestionQuery {
    section: Option<String>,
    difficulty: Option<String>,
}

/// POST /api/add-question
pub async fn add_question(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let mut question = match object_body(body) {
        Ok(doc) => doc,
        Err(resp) => return resp,
    };
    if !has_fields(&question, REQUIRED) {
        return response::bad_request(MISSING_FIELDS).into_response();
    }
    question.insert("created_at".to_string(), timestamp());

    match state
        .store
        .insert_one(collections::PROBLEM_SETS, question)
        .await
    {
        Ok(_) => response::message(StatusCode::CREATED, "Question added").into_response(),
        Err(e) => storage_failure(e),
    }
}

/// GET /api/questions?section=&difficulty=
pub async fn list_questions(
    State(state): State<AppState>,
    Query(query): Query<QuestionQuery>,
) -> Response {
    let mut by = Filter::new();
    for (field, value) in [("section", query.section), ("difficulty", query.difficulty)] {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            by.insert(field.to_string(), Value::String(value));
        }
    }

    match state.store.find(collections::PROBLEM_SETS, &by).await {
        Ok(questions) => Json(questions).into_response(),
        Err(e) => storage_failure(e),
    }
}

/// GET /api/problem-set/{question_id}
pub async fn get_problem_set(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> Response {
    match state
        .store
        .find_one(collections::PROBLEM_SETS, &filter([("question_id", question_id)]))
        .await
    {
        Ok(Some(question)) => Json(question).into_response(),
        Ok(None) => response::not_found("Not found").into_response(),
        Err(e) => storage_failure(e),
    }
}

/// PUT /api/question/{question_id}
///
/// Shallow-merges the body into the stored question.
pub async fn update_question(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let fields = match object_body(body) {
        Ok(doc) => doc,
        Err(resp) => return resp,
    };
    if fields.is_empty() {
        return response::bad_request("No fields to update").into_response();
    }

    match state
        .store
        .update_one(
            collections::PROBLEM_SETS,
            &filter([("question_id", question_id)]),
            fields,
        )
        .await
    {
        Ok(0) => response::not_found("Question not found").into_response(),
        Ok(_) => response::message(StatusCode::OK, "Question updated").into_response(),
        Err(e) => storage_failure(e),
    }
}

/// DELETE /api/question/{question_id}
pub async fn delete_question(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> Response {
    match state
        .store
        .delete_one(collections::PROBLEM_SETS, &filter([("question_id", question_id)]))
        .await
    {
        Ok(0) => response::not_found("Question not found").into_response(),
        Ok(_) => response::message(StatusCode::OK, "Question deleted").into_response(),
        Err(e) => storage_failure(e),
    }
}
