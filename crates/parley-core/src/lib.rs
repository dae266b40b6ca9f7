pub mod client;
pub mod config;
pub mod conversation;
pub mod credential;
pub mod form;
pub mod input;
pub mod state;
pub mod storage;
pub mod task;

// Re-export main types for convenience
pub use client::{BackendClient, ChatBackend, ChatError, ChatRequest, ChatResponse, ErrorResponse};
pub use config::Config;
pub use conversation::{Conversation, PendingRequest, Submission};
pub use credential::{CredentialError, CredentialStore};
pub use form::{ApiKeyForm, Notice, NoticeKind};
pub use input::TextInput;
pub use state::{ChatRole, ChatTurn, TurnContent};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use task::RequestTask;
