//! Form glue for saving the API key from the sidebar

use crate::credential::{CredentialError, CredentialStore};
use crate::input::TextInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Destructive,
}

/// Short message shown after a form action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    fn success(title: &str, description: &str) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    fn destructive(description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Destructive,
            title: "Error".to_string(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApiKeyForm {
    pub input: TextInput,
}

impl ApiKeyForm {
    /// Form pre-filled with the current credential
    pub fn new(store: &CredentialStore) -> Self {
        Self {
            input: TextInput::with_value(store.get()),
        }
    }

    /// Save is disabled while the field is blank
    pub fn can_submit(&self) -> bool {
        !self.input.is_blank()
    }

    pub fn submit(&mut self, store: &mut CredentialStore) -> Notice {
        match store.set(self.input.value()) {
            Ok(()) => {
                self.input = TextInput::with_value(store.get());
                Notice::success(
                    "API Key Updated",
                    "Your OpenAI API key has been successfully saved.",
                )
            }
            Err(e @ CredentialError::Empty) => Notice::destructive(e.to_string()),
            Err(e @ CredentialError::Storage(_)) => {
                tracing::error!("{e:#}");
                Notice::destructive(e.to_string())
            }
        }
    }

    /// Key as displayed in the sidebar: masked except the last four chars
    pub fn masked(&self) -> String {
        mask_key(self.input.value())
    }
}

pub fn mask_key(key: &str) -> String {
    let char_count = key.chars().count();
    if char_count <= 4 {
        return "*".repeat(char_count);
    }

    let masked_len = char_count - 4;
    let last_four: String = key.chars().skip(masked_len).collect();
    format!("{}{}", "*".repeat(masked_len), last_four)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::CREDENTIAL_KEY;
    use crate::storage::MemoryStore;

    fn empty_store() -> CredentialStore {
        CredentialStore::load(Box::new(MemoryStore::new()))
    }

    #[test]
    fn test_form_seeds_from_current_credential() {
        let store = CredentialStore::load(Box::new(MemoryStore::with_item(CREDENTIAL_KEY, "sk-xyz")));
        let form = ApiKeyForm::new(&store);
        assert_eq!(form.input.value(), "sk-xyz");
    }

    #[test]
    fn test_blank_input_cannot_submit() {
        let mut form = ApiKeyForm::new(&empty_store());
        assert!(!form.can_submit());
        form.input = TextInput::with_value("  ");
        assert!(!form.can_submit());
        form.input = TextInput::with_value("sk");
        assert!(form.can_submit());
    }

    #[test]
    fn test_blank_submit_yields_validation_notice() {
        let mut store = empty_store();
        let mut form = ApiKeyForm::new(&store);
        form.input = TextInput::with_value("  ");

        let notice = form.submit(&mut store);
        assert_eq!(notice.kind, NoticeKind::Destructive);
        assert_eq!(notice.title, "Error");
        assert_eq!(notice.description, "API key cannot be empty.");
        assert_eq!(store.storage().get_item(CREDENTIAL_KEY).unwrap(), None);
    }

    #[test]
    fn test_successful_submit_updates_store_and_normalizes_input() {
        let mut store = empty_store();
        let mut form = ApiKeyForm::new(&store);
        form.input = TextInput::with_value(" sk-abc ");

        let notice = form.submit(&mut store);
        assert_eq!(notice.kind, NoticeKind::Success);
        assert_eq!(notice.title, "API Key Updated");
        assert_eq!(store.get(), "sk-abc");
        assert_eq!(form.input.value(), "sk-abc");
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key(""), "");
        assert_eq!(mask_key("abc"), "***");
        assert_eq!(mask_key("sk-abcdef"), "*****cdef");

        let long_key = format!("sk-{}", "x".repeat(48));
        assert_eq!(mask_key(&long_key).chars().count(), long_key.chars().count());
    }
}
