//! Route table for the chat API.

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use super::handlers::{self, ChatAppState};

/// Builds the chat router. The caller supplies the state and outer
/// middleware layers.
pub fn routes() -> Router<ChatAppState> {
    Router::new()
        .route("/health", get(health))
        .route("/chat/sessions", post(handlers::start_session))
        .route(
            "/chat/sessions/:session_id/messages",
            post(handlers::send_message),
        )
        .route(
            "/chat/sessions/:session_id",
            get(handlers::get_session).delete(handlers::end_session),
        )
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
