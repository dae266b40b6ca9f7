use std::sync::Arc;
use parley_core::{
    ApiKeyForm, ChatBackend, Conversation, CredentialStore, Notice, RequestTask, Submission,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Sidebar,
    Chat,
}

pub struct App {
    pub should_quit: bool,
    pub focus: FocusPane,

    // Credential state (sidebar)
    pub credentials: CredentialStore,
    pub key_form: ApiKeyForm,
    pub notice: Option<Notice>,

    // Conversation state (chat panel)
    pub conversation: Conversation,
    pub tasks: Vec<RequestTask>,
    pub chat_scroll: u16,
    pub chat_height: u16, // Inner height of the chat area, set during render
    pub chat_width: u16,  // Inner width of the chat area, set during render

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub backend: Arc<dyn ChatBackend>,
    pub endpoint: String,
}

impl App {
    pub fn new(credentials: CredentialStore, backend: Arc<dyn ChatBackend>, endpoint: &str) -> Self {
        // Start in the sidebar until a key exists
        let focus = if credentials.is_set() {
            FocusPane::Chat
        } else {
            FocusPane::Sidebar
        };
        let key_form = ApiKeyForm::new(&credentials);

        Self {
            should_quit: false,
            focus,

            credentials,
            key_form,
            notice: None,

            conversation: Conversation::new(),
            tasks: Vec::new(),
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            animation_frame: 0,

            backend,
            endpoint: endpoint.to_string(),
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FocusPane::Sidebar => FocusPane::Chat,
            FocusPane::Chat => FocusPane::Sidebar,
        };
    }

    /// Send the draft. Ignored while a reply is outstanding.
    pub fn submit_message(&mut self) {
        if self.conversation.is_pending() {
            return;
        }

        match self.conversation.begin_submit(&self.credentials) {
            Submission::Started(pending) => {
                self.tasks.push(RequestTask::spawn(self.backend.clone(), pending));
                self.scroll_chat_to_bottom();
            }
            Submission::MissingCredential => self.scroll_chat_to_bottom(),
            Submission::Empty => {}
        }
    }

    pub fn save_api_key(&mut self) {
        let notice = self.key_form.submit(&mut self.credentials);
        self.notice = Some(notice);
    }

    /// Fold finished requests back into the conversation
    pub async fn poll_tasks(&mut self) {
        if self.tasks.is_empty() {
            return;
        }

        let (finished, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|task| task.is_finished());
        self.tasks = running;

        if finished.is_empty() {
            return;
        }

        for task in finished {
            let (slot, outcome) = task.join().await;
            self.conversation.resolve(slot, outcome);
        }
        self.scroll_chat_to_bottom();
    }

    /// Cancel anything still in flight
    pub fn shutdown(&mut self) {
        for task in &self.tasks {
            task.cancel();
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.conversation.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.total_chat_lines());
    }

    /// Scroll chat so the newest turn is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        let total_lines = self.total_chat_lines();

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }

    /// Estimated wrapped line count of the whole conversation
    fn total_chat_lines(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for turn in self.conversation.turns() {
            let mut turn_lines = 2; // Role line and trailing blank line
            if turn.is_pending() {
                turn_lines += 1; // "Thinking..."
            }
            for line in turn.text().lines() {
                turn_lines += line.chars().count() / wrap_width + 1;
            }
            total_lines = total_lines.saturating_add(u16::try_from(turn_lines).unwrap_or(u16::MAX));
        }
        total_lines
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use parley_core::credential::CREDENTIAL_KEY;
    use parley_core::{ChatError, ChatRequest, ChatRole, ChatTurn, MemoryStore, TextInput};

    pub(crate) struct Echo;

    #[async_trait]
    impl ChatBackend for Echo {
        async fn send(&self, request: &ChatRequest) -> Result<String, ChatError> {
            Ok(format!("echo: {}", request.text))
        }
    }

    pub(crate) fn test_app(key: Option<&str>) -> App {
        let storage = match key {
            Some(key) => MemoryStore::with_item(CREDENTIAL_KEY, key),
            None => MemoryStore::new(),
        };
        App::new(
            CredentialStore::load(Box::new(storage)),
            Arc::new(Echo),
            "http://127.0.0.1:5328/api/chatbot",
        )
    }

    pub(crate) async fn settle(app: &mut App) {
        while !app.tasks.iter().all(|task| task.is_finished()) {
            tokio::task::yield_now().await;
        }
        app.poll_tasks().await;
    }

    #[test]
    fn test_focus_starts_in_sidebar_without_key() {
        assert_eq!(test_app(None).focus, FocusPane::Sidebar);
        assert_eq!(test_app(Some("sk-abc")).focus, FocusPane::Chat);
    }

    #[tokio::test]
    async fn test_submit_and_poll_round_trip() {
        let mut app = test_app(Some("sk-abc"));
        app.conversation.draft = TextInput::with_value("hello");

        app.submit_message();
        assert_eq!(app.tasks.len(), 1);
        assert!(app.conversation.turns()[1].is_pending());

        settle(&mut app).await;
        assert!(app.tasks.is_empty());
        assert_eq!(app.conversation.turns()[1], ChatTurn::assistant("echo: hello"));
    }

    #[tokio::test]
    async fn test_submit_is_ignored_while_pending() {
        let mut app = test_app(Some("sk-abc"));
        app.conversation.draft = TextInput::with_value("first");
        app.submit_message();

        app.conversation.draft = TextInput::with_value("second");
        app.submit_message();

        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.conversation.turns().len(), 2);
        assert_eq!(app.conversation.draft.value(), "second");
        settle(&mut app).await;
    }

    #[test]
    fn test_submit_without_key_adds_error_turn() {
        let mut app = test_app(None);
        app.conversation.draft = TextInput::with_value("hello");
        app.submit_message();

        assert!(app.tasks.is_empty());
        assert_eq!(app.conversation.turns().len(), 1);
        assert_eq!(app.conversation.turns()[0].role, ChatRole::Error);
    }

    #[test]
    fn test_save_api_key_sets_notice() {
        let mut app = test_app(None);
        app.key_form.input = TextInput::with_value("sk-new");
        app.save_api_key();

        assert_eq!(app.credentials.get(), "sk-new");
        assert_eq!(app.notice.as_ref().map(|n| n.title.as_str()), Some("API Key Updated"));
    }
}
