//! Editor tunables.
//!
//! # Responsibility
//! - Hold debounce windows, storage keys and default titles.
//! - Parse JSON overrides where every field is optional.

use serde::Deserialize;
use std::time::Duration;

const DEFAULT_COMMIT_DEBOUNCE_MS: u64 = 500;
const DEFAULT_PERSIST_DEBOUNCE_MS: u64 = 1000;

/// Storage keys for the persisted collection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    /// Key holding the JSON array of documents.
    pub documents: String,
    /// Key holding the active document id.
    pub active_id: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            documents: "textEditorNotes".to_string(),
            active_id: "textEditorCurrentNoteId".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Quiet period after the last input before content is committed.
    pub commit_debounce_ms: u64,
    /// Quiet period after the last collection change before it is persisted.
    pub persist_debounce_ms: u64,
    pub storage_keys: StorageKeys,
    /// Title of the document created when storage holds nothing usable.
    pub default_title: String,
    /// New documents are titled `<prefix> <n>`.
    pub new_title_prefix: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            commit_debounce_ms: DEFAULT_COMMIT_DEBOUNCE_MS,
            persist_debounce_ms: DEFAULT_PERSIST_DEBOUNCE_MS,
            storage_keys: StorageKeys::default(),
            default_title: "New document".to_string(),
            new_title_prefix: "Document".to_string(),
        }
    }
}

impl EditorConfig {
    /// Parses overrides; absent fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn commit_debounce(&self) -> Duration {
        Duration::from_millis(self.commit_debounce_ms)
    }

    pub fn persist_debounce(&self) -> Duration {
        Duration::from_millis(self.persist_debounce_ms)
    }
}
