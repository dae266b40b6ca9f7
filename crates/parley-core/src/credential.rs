//! The API credential shared by every consumer of the app
//!
//! One `CredentialStore` is created at startup and handed by reference to
//! whatever needs the key. There is no global.

use crate::storage::KeyValueStore;
use thiserror::Error;

/// Storage key the credential is persisted under
pub const CREDENTIAL_KEY: &str = "openai_api_key";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("API key cannot be empty.")]
    Empty,
    #[error("Failed to save API key: {0:#}")]
    Storage(anyhow::Error),
}

pub struct CredentialStore {
    value: String,
    storage: Box<dyn KeyValueStore>,
}

impl CredentialStore {
    /// Adopt the persisted credential if there is one. A missing entry, or
    /// storage that can't be read, leaves the credential unset.
    pub fn load(storage: Box<dyn KeyValueStore>) -> Self {
        let value = match storage.get_item(CREDENTIAL_KEY) {
            Ok(Some(stored)) if !stored.trim().is_empty() => {
                tracing::debug!("loaded persisted API key");
                stored
            }
            Ok(_) => String::new(),
            Err(e) => {
                tracing::warn!("could not read persisted API key: {e:#}");
                String::new()
            }
        };

        Self { value, storage }
    }

    /// Current credential, empty when unset
    pub fn get(&self) -> &str {
        &self.value
    }

    pub fn is_set(&self) -> bool {
        !self.value.is_empty()
    }

    /// Persist and adopt a new credential. Whitespace-only input is
    /// rejected without touching storage.
    pub fn set(&mut self, value: &str) -> Result<(), CredentialError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CredentialError::Empty);
        }

        self.storage
            .set_item(CREDENTIAL_KEY, trimmed)
            .map_err(CredentialError::Storage)?;
        self.value = trimmed.to_string();
        tracing::info!("API key updated");
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("is_set", &self.is_set())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};
    use anyhow::anyhow;
    use tempfile::TempDir;

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get_item(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Err(anyhow!("disk on fire"))
        }

        fn set_item(&mut self, _key: &str, _value: &str) -> anyhow::Result<()> {
            Err(anyhow!("read-only"))
        }
    }

    #[test]
    fn test_starts_unset_without_persisted_value() {
        let store = CredentialStore::load(Box::new(MemoryStore::new()));
        assert!(!store.is_set());
        assert_eq!(store.get(), "");
    }

    #[test]
    fn test_adopts_persisted_value() {
        let store = CredentialStore::load(Box::new(MemoryStore::with_item(CREDENTIAL_KEY, "sk-xyz")));
        assert!(store.is_set());
        assert_eq!(store.get(), "sk-xyz");
    }

    #[test]
    fn test_unreadable_storage_leaves_credential_unset() {
        let store = CredentialStore::load(Box::new(FailingStore));
        assert!(!store.is_set());
    }

    #[test]
    fn test_whitespace_value_is_rejected_and_not_persisted() {
        let mut store = CredentialStore::load(Box::new(MemoryStore::new()));

        let err = store.set("   ").unwrap_err();
        assert!(matches!(err, CredentialError::Empty));
        assert_eq!(err.to_string(), "API key cannot be empty.");
        assert!(!store.is_set());
        assert_eq!(store.storage().get_item(CREDENTIAL_KEY).unwrap(), None);
    }

    #[test]
    fn test_rejected_value_keeps_previous_credential() {
        let mut store = CredentialStore::load(Box::new(MemoryStore::with_item(CREDENTIAL_KEY, "sk-old")));
        assert!(store.set("\t\n").is_err());
        assert_eq!(store.get(), "sk-old");
        assert_eq!(store.storage().get_item(CREDENTIAL_KEY).unwrap().as_deref(), Some("sk-old"));
    }

    #[test]
    fn test_set_trims_and_persists() {
        let mut store = CredentialStore::load(Box::new(MemoryStore::new()));
        store.set("  sk-abc ").unwrap();

        assert_eq!(store.get(), "sk-abc");
        assert_eq!(store.storage().get_item(CREDENTIAL_KEY).unwrap().as_deref(), Some("sk-abc"));
    }

    #[test]
    fn test_storage_failure_keeps_memory_unchanged() {
        let mut store = CredentialStore::load(Box::new(FailingStore));
        let err = store.set("sk-abc").unwrap_err();
        assert!(matches!(err, CredentialError::Storage(_)));
        assert!(!store.is_set());
    }

    #[test]
    fn test_value_survives_reload_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");

        let mut store = CredentialStore::load(Box::new(FileStore::new(&path)));
        store.set("sk-xyz").unwrap();
        drop(store);

        let reloaded = CredentialStore::load(Box::new(FileStore::new(&path)));
        assert_eq!(reloaded.get(), "sk-xyz");
    }

    #[test]
    fn test_set_recovers_from_corrupt_storage_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{ truncated").unwrap();

        let mut store = CredentialStore::load(Box::new(FileStore::new(&path)));
        assert!(!store.is_set());
        store.set("sk-abc").unwrap();

        let reloaded = CredentialStore::load(Box::new(FileStore::new(&path)));
        assert_eq!(reloaded.get(), "sk-abc");
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let store = CredentialStore::load(Box::new(MemoryStore::with_item(CREDENTIAL_KEY, "sk-secret")));
        let rendered = format!("{:?}", store);
        assert!(!rendered.contains("sk-secret"));
    }
}
