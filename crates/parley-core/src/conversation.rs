//! Conversation state machine
//!
//! A submission is split around its one suspension point: `begin_submit`
//! does the synchronous checks and inserts the placeholder, the caller sends
//! the returned request however it likes, and `resolve` replaces the
//! placeholder with the outcome. `submit` strings the three together for
//! callers that just want to await.

use crate::client::{ChatBackend, ChatError, ChatRequest};
use crate::credential::CredentialStore;
use crate::input::TextInput;
use crate::state::ChatTurn;

/// Session identifier sent with every request
pub const DEFAULT_SESSION_ID: &str = "default-session";

pub const MISSING_CREDENTIAL_MESSAGE: &str =
    "API Key Required: Please enter your API key before sending a message.";

/// A request ready to send, and the index of the placeholder it resolves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub slot: usize,
    pub request: ChatRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// No credential; an error turn was appended instead of sending
    MissingCredential,
    /// Draft was blank; nothing changed
    Empty,
    Started(PendingRequest),
}

#[derive(Debug, Clone)]
pub struct Conversation {
    session_id: String,
    turns: Vec<ChatTurn>,
    pending: bool,
    pub draft: TextInput,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            session_id: DEFAULT_SESSION_ID.to_string(),
            turns: Vec::new(),
            pending: false,
            draft: TextInput::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// True while a request is in flight
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn begin_submit(&mut self, credentials: &CredentialStore) -> Submission {
        if !credentials.is_set() {
            tracing::info!("submit refused: no API key set");
            self.turns.push(ChatTurn::error(MISSING_CREDENTIAL_MESSAGE));
            return Submission::MissingCredential;
        }

        if self.draft.is_blank() {
            return Submission::Empty;
        }

        let text = self.draft.take();
        self.turns.push(ChatTurn::user(text.clone()));
        self.turns.push(ChatTurn::placeholder());
        self.pending = true;

        let slot = self.turns.len() - 1;
        tracing::debug!(slot, "submission started");

        Submission::Started(PendingRequest {
            slot,
            request: ChatRequest {
                session_id: self.session_id.clone(),
                text,
                openai_api_key: credentials.get().to_string(),
            },
        })
    }

    /// Replace the placeholder at `slot` with the outcome of its request.
    /// A slot that is missing or already resolved is left alone.
    pub fn resolve(&mut self, slot: usize, outcome: Result<String, ChatError>) {
        match self.turns.get_mut(slot) {
            Some(turn) if turn.is_pending() => {
                *turn = match outcome {
                    Ok(data) => ChatTurn::assistant(data),
                    Err(e) => {
                        tracing::warn!(slot, "chat request failed: {e}");
                        ChatTurn::error(e.turn_message())
                    }
                };
            }
            _ => tracing::warn!(slot, "no pending placeholder to resolve"),
        }
        self.pending = false;
    }

    pub async fn submit(&mut self, credentials: &CredentialStore, backend: &dyn ChatBackend) -> Submission {
        let submission = self.begin_submit(credentials);
        if let Submission::Started(pending) = &submission {
            let outcome = backend.send(&pending.request).await;
            self.resolve(pending.slot, outcome);
        }
        submission
    }
}
