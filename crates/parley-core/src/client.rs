use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shown when the server rejects a request without saying why
pub const SERVER_ERROR_FALLBACK: &str = "An error occurred while processing your request.";
/// Shown when a transport or parse failure carries no message
pub const UNEXPECTED_ERROR_FALLBACK: &str = "An unexpected error occurred.";

/// Body of a chat request as sent to the backend
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    pub session_id: String,
    pub text: String,
    pub openai_api_key: String,
}

impl std::fmt::Debug for ChatRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatRequest")
            .field("session_id", &self.session_id)
            .field("text", &self.text)
            .field("openai_api_key", &"<redacted>")
            .finish()
    }
}

/// Success body: `{ "data": "..." }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub data: String,
}

/// Failure body: `{ "error": "..." }`, with `error` optional
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("server returned {status}: {}", .message.as_deref().unwrap_or(SERVER_ERROR_FALLBACK))]
    Server { status: u16, message: Option<String> },
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Decode(String),
    #[error("Request cancelled.")]
    Cancelled,
}

impl ChatError {
    /// Text for the error turn that replaces a failed placeholder
    pub fn turn_message(&self) -> String {
        match self {
            ChatError::Server { message, .. } => message
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(SERVER_ERROR_FALLBACK)
                .to_string(),
            ChatError::Transport(message) | ChatError::Decode(message) => {
                if message.trim().is_empty() {
                    UNEXPECTED_ERROR_FALLBACK.to_string()
                } else {
                    message.clone()
                }
            }
            ChatError::Cancelled => self.to_string(),
        }
    }
}

/// Anything that can answer a chat request
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<String, ChatError>;
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    endpoint: String,
}

impl BackendClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }
}

#[async_trait]
impl ChatBackend for BackendClient {
    async fn send(&self, request: &ChatRequest) -> Result<String, ChatError> {
        tracing::debug!(endpoint = %self.endpoint, session_id = %request.session_id, "sending chat request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        if !status.is_success() {
            let error: ErrorResponse = serde_json::from_str(&body)
                .map_err(|e| ChatError::Decode(format!("Invalid error response from server: {}", e)))?;
            tracing::warn!(status = status.as_u16(), "chat request rejected");
            return Err(ChatError::Server {
                status: status.as_u16(),
                message: error.error,
            });
        }

        let chat_response: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| ChatError::Decode(format!("Invalid response from server: {}", e)))?;
        Ok(chat_response.data)
    }
}
