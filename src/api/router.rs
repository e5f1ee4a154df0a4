use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::chat;
use super::health;
use super::state::AppState;

/// Routes of the chat service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .route("/chat", post(chat::chat))
        .route("/chat/suggestions", get(chat::suggestions))
        .route("/chat/sessions/{session_id}", delete(chat::clear_session))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
