//! UI-agnostic conversation types
//!
//! These are shared by the terminal shell and anything else that wants to
//! render a conversation. Nothing here depends on a UI framework.

use serde::{Deserialize, Serialize};

/// The author of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    Error,
}

impl ChatRole {
    pub fn label(&self) -> &'static str {
        match self {
            ChatRole::User => "You",
            ChatRole::Assistant => "Assistant",
            ChatRole::Error => "Error",
        }
    }
}

/// Body of a turn. `Pending` marks the placeholder inserted before a
/// request resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum TurnContent {
    Pending,
    Text(String),
}

/// One message unit in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: TurnContent,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: TurnContent::Text(text.into()),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: TurnContent::Text(text.into()),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Error,
            content: TurnContent::Text(text.into()),
        }
    }

    pub fn placeholder() -> Self {
        Self {
            role: ChatRole::Assistant,
            content: TurnContent::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.content, TurnContent::Pending)
    }

    /// Text of the turn, empty for a placeholder
    pub fn text(&self) -> &str {
        match &self.content {
            TurnContent::Pending => "",
            TurnContent::Text(text) => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_pending_assistant() {
        let turn = ChatTurn::placeholder();
        assert_eq!(turn.role, ChatRole::Assistant);
        assert!(turn.is_pending());
        assert_eq!(turn.text(), "");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatTurn::error("boom")).unwrap();
        assert_eq!(json, r#"{"role":"error","content":{"kind":"text","text":"boom"}}"#);
    }
}
