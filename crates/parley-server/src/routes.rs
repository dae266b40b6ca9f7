use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use parley_core::{ChatResponse, ErrorResponse};
use serde_json::Value;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::history::SessionHistory;
use crate::openai::{OpenAIClient, OpenAIMessage};

pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Answer all questions to the best of your ability in English.";

pub struct AppState {
    pub openai: OpenAIClient,
    pub history: SessionHistory,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chatbot", post(chatbot))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorResponse {
        error: Some(message.into()),
    };
    (status, Json(body)).into_response()
}

/// Non-empty string field of the request body
fn field<'a>(data: &'a Value, name: &str) -> Option<&'a str> {
    data.get(name).and_then(Value::as_str).filter(|s| !s.is_empty())
}

async fn chatbot(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let data = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(map)) if !map.is_empty() => Value::Object(map),
        _ => {
            tracing::error!("No JSON data found in the request.");
            return error_response(StatusCode::BAD_REQUEST, "No JSON data found in the request.");
        }
    };

    let Some(api_key) = field(&data, "openai_api_key") else {
        return error_response(StatusCode::BAD_REQUEST, "Missing 'openai_api_key' in the request.");
    };

    let (Some(session_id), Some(text)) = (field(&data, "session_id"), field(&data, "text")) else {
        tracing::error!("Missing 'session_id' or 'text' in the request.");
        return error_response(StatusCode::BAD_REQUEST, "Missing 'session_id' or 'text' in the request.");
    };

    let mut messages = vec![OpenAIMessage::system(SYSTEM_PROMPT)];
    messages.extend(state.history.messages(session_id));
    messages.push(OpenAIMessage::user(text));

    tracing::info!(session_id, turns = messages.len(), model = state.openai.model(), "relaying chat request");

    match state.openai.complete(api_key, &messages).await {
        Ok(reply) => {
            state.history.record(session_id, text, &reply);
            let body = ChatResponse {
                status: Some("success".to_string()),
                data: reply,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            tracing::error!("An error occurred while processing the request: {e:#}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
