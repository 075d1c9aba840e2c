//! Persona chat handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::llm::ChatResult;
use crate::response;
use crate::server::AppState;

const MISSING_CHAT_FIELDS: &str = "Missing 'name' or 'prompt'";

#[derive(Deserialize)]
pub struct ChatBody {
    #[serde(alias = "nickname")]
    name: Option<String>,
    #[serde(alias = "message")]
    prompt: Option<String>,
}

/// POST /api/chat
///
/// Request body: `{"name": "...", "prompt": "..."}` (`nickname` / `message`
/// are accepted as aliases).
///
/// - 200 `{"response": "..."}` on success
/// - 400 `{"error": "Missing 'name' or 'prompt'"}` on missing or blank fields
/// - 500 `{"error": "..."}` when the persona is unknown or the provider failed
pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Response {
    let Ok(Json(ChatBody {
        name: Some(name),
        prompt: Some(prompt),
    })) = body
    else {
        return response::bad_request(MISSING_CHAT_FIELDS).into_response();
    };

    match state.dispatcher.chat(&name, &prompt).await {
        Err(_) => response::bad_request(MISSING_CHAT_FIELDS).into_response(),
        Ok(result @ ChatResult::Response(_)) => (StatusCode::OK, Json(result)).into_response(),
        Ok(result @ ChatResult::Error(_)) => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(result)).into_response()
        }
    }
}

/// GET /api/models
pub async fn list_models(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(
        state
            .dispatcher
            .registry()
            .nicknames()
            .map(str::to_string)
            .collect(),
    )
}
