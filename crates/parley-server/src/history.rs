use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::openai::OpenAIMessage;

/// Per-session message history, kept in memory for the life of the server
#[derive(Clone, Default)]
pub struct SessionHistory {
    sessions: Arc<Mutex<HashMap<String, Vec<OpenAIMessage>>>>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<OpenAIMessage>>> {
        // Pushes are whole messages, so a poisoned map is still consistent
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Messages recorded so far for `session_id`, oldest first
    pub fn messages(&self, session_id: &str) -> Vec<OpenAIMessage> {
        self.lock().get(session_id).cloned().unwrap_or_default()
    }

    /// Record one completed exchange
    pub fn record(&self, session_id: &str, user_text: &str, reply: &str) {
        let mut sessions = self.lock();
        let history = sessions.entry(session_id.to_string()).or_default();
        history.push(OpenAIMessage::user(user_text));
        history.push(OpenAIMessage::assistant(reply));
    }
}
