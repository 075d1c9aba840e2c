//! `/api` handlers: persona chat and quiz data.

mod answers;
mod chat;
mod mappings;
mod questions;
mod stats;
mod transcripts;

pub use answers::{list_attempts, submit_answer};
pub use chat::{chat, list_models};
pub use mappings::{create_mapping, delete_mapping, list_mappings};
pub use questions::{
    add_question, delete_question, get_problem_set, list_questions, update_question,
};
pub use stats::stats;
pub use transcripts::save_chat;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::Value;
use tracing::error;

use crate::response;
use crate::store::{Document, StorageError};

const MISSING_FIELDS: &str = "Missing fields";

/// Accept only a JSON object body.
fn object_body(body: Result<Json<Value>, JsonRejection>) -> Result<Document, Response> {
    match body {
        Ok(Json(Value::Object(document))) => Ok(document),
        Ok(_) => Err(response::bad_request("Request body must be a JSON object").into_response()),
        Err(rejection) => Err(response::bad_request(rejection.body_text()).into_response()),
    }
}

fn has_fields(document: &Document, required: &[&str]) -> bool {
    required.iter().all(|field| document.contains_key(*field))
}

fn storage_failure(err: StorageError) -> Response {
    error!(error = %err, "Document store operation failed");
    response::internal_error(err.to_string()).into_response()
}

fn timestamp() -> Value {
    Value::String(Utc::now().to_rfc3339())
}
