//! Aggregate counters.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use super::storage_failure;
use crate::server::AppState;
use crate::store::{Filter, StorageResult, collections};

#[derive(Serialize)]
pub struct StatsResponse {
    total_questions: u64,
    total_answers: u64,
    total_chats: u64,
    total_llms: u64,
}

/// GET /api/stats
pub async fn stats(State(state): State<AppState>) -> Response {
    match collect(&state).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => storage_failure(e),
    }
}

async fn collect(state: &AppState) -> StorageResult<StatsResponse> {
    let all = Filter::new();
    Ok(StatsResponse {
        total_questions: state.store.count(collections::PROBLEM_SETS, &all).await?,
        total_answers: state.store.count(collections::STUDENT_ANSWERS, &all).await?,
        total_chats: state.store.count(collections::CHAT_HISTORY, &all).await?,
        total_llms: state.store.count(collections::LLM_MAPPINGS, &all).await?,
    })
}
