//! Chat endpoints

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use futures::StreamExt;
use tracing::{debug, info};
use validator::Validate;

use super::state::AppState;
use super::types::{ApiError, ChatRequestBody, Json, StreamFrame, SuggestionsResponse};
use crate::domain::{ChatEvent, DomainError};

/// `POST /chat` - one turn, either as a single JSON reply or as SSE
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequestBody>,
) -> Result<Response, ApiError> {
    body.validate()
        .map_err(|e| DomainError::validation(e.to_string()))?;

    info!(
        session_id = %body.session_id,
        stream = body.stream,
        chars = body.message.chars().count(),
        "Chat request received"
    );

    if body.stream {
        let events = state
            .chat_engine
            .stream_chat(&body.message, &body.session_id)
            .await;
        let stream = events.map(|event| Ok::<_, Infallible>(sse_event(event)));

        return Ok(Sse::new(stream)
            .keep_alive(KeepAlive::default())
            .into_response());
    }

    let reply = state
        .chat_engine
        .chat(&body.message, &body.session_id)
        .await;
    Ok(Json(reply).into_response())
}

fn sse_event(event: ChatEvent) -> Event {
    Event::default()
        .json_data(StreamFrame::from(event))
        .unwrap_or_else(|_| Event::default().comment("unencodable frame"))
}

/// `GET /chat/suggestions`
pub async fn suggestions(State(state): State<AppState>) -> Json<SuggestionsResponse> {
    Json(SuggestionsResponse {
        suggestions: state.chat_engine.get_suggestions(),
    })
}

/// `DELETE /chat/sessions/{session_id}` - idempotent
pub async fn clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    debug!(session_id = %session_id, "Clearing chat session");
    state.chat_engine.clear_history(&session_id).await;
    StatusCode::NO_CONTENT
}
