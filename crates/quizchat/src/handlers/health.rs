use axum::Json;
use axum::http::StatusCode;

use crate::response::{self, MessageBody};

pub async fn livez() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

pub async fn readyz() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// GET /
pub async fn index() -> (StatusCode, Json<MessageBody>) {
    response::message(StatusCode::OK, "quizchat backend is running")
}
