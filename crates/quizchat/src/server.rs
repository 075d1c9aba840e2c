use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use tower_http::timeout::TimeoutLayer;

use crate::handlers;
use crate::llm::Dispatcher;
use crate::store::DocumentStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub store: Arc<dyn DocumentStore>,
}

pub fn build_app(state: AppState, request_timeout_secs: u64) -> Router {
    let api = Router::new()
        .route("/chat", post(handlers::api::chat))
        .route("/models", get(handlers::api::list_models))
        .route("/add-question", post(handlers::api::add_question))
        .route("/questions", get(handlers::api::list_questions))
        .route(
            "/problem-set/{question_id}",
            get(handlers::api::get_problem_set),
        )
        .route(
            "/question/{question_id}",
            delete(handlers::api::delete_question).put(handlers::api::update_question),
        )
        .route("/submit-answer", post(handlers::api::submit_answer))
        .route("/attempts", get(handlers::api::list_attempts))
        .route("/save-chat", post(handlers::api::save_chat))
        .route(
            "/llm-mapping",
            get(handlers::api::list_mappings).post(handlers::api::create_mapping),
        )
        .route("/llm-mapping/{llm_id}", delete(handlers::api::delete_mapping))
        .route("/stats", get(handlers::api::stats))
        .with_state(state);

    Router::new()
        .route("/", get(handlers::index))
        .route("/livez", get(handlers::livez))
        .route("/readyz", get(handlers::readyz))
        .nest("/api", api)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(request_timeout_secs),
        ))
}
