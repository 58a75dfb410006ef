//! Document record and identifier.
//!
//! # Responsibility
//! - Define the `{ id, title, content }` record persisted and exported by core.
//! - Generate ids for new and imported documents.
//!
//! # Invariants
//! - `DocumentId` is never empty.
//! - Serialized shape is exactly `{ "id", "title", "content" }`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const IMPORTED_ID_PREFIX: &str = "imported";
const IMPORTED_SUFFIX_LEN: usize = 9;
const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Stable identifier of one document.
///
/// Stored as an opaque string so ids written by older sessions
/// (`"1"`, timestamps, `imported_*`) round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Wraps an existing id value.
    ///
    /// Returns `None` for blank values.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Id generated for a freshly added document: epoch milliseconds.
    pub fn from_timestamp() -> Self {
        Self(Utc::now().timestamp_millis().to_string())
    }

    /// Id generated for an imported document:
    /// `imported_<epoch millis>_<9 base-36 chars>`.
    pub fn imported() -> Self {
        Self(format!(
            "{IMPORTED_ID_PREFIX}_{}_{}",
            Utc::now().timestamp_millis(),
            random_base36_suffix()
        ))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for DocumentId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "document id cannot be blank".to_string())
    }
}

impl From<DocumentId> for String {
    fn from(value: DocumentId) -> Self {
        value.0
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One named rich-text document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    /// Serialized surface markup.
    pub content: String,
}

impl Document {
    pub fn new(id: DocumentId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
        }
    }

    /// Creates an empty document with the given title.
    pub fn empty(id: DocumentId, title: impl Into<String>) -> Self {
        Self::new(id, title, String::new())
    }
}

fn random_base36_suffix() -> String {
    let mut value = Uuid::new_v4().as_u128();
    let mut suffix = String::with_capacity(IMPORTED_SUFFIX_LEN);
    for _ in 0..IMPORTED_SUFFIX_LEN {
        suffix.push(char::from(BASE36_DIGITS[(value % 36) as usize]));
        value /= 36;
    }
    suffix
}

#[cfg(test)]
mod tests {
    use super::{Document, DocumentId};

    #[test]
    fn blank_ids_are_rejected() {
        assert!(DocumentId::new("").is_none());
        assert!(DocumentId::new("   ").is_none());
        assert_eq!(DocumentId::new("1").unwrap().as_str(), "1");
    }

    #[test]
    fn imported_ids_carry_prefix_timestamp_and_suffix() {
        let id = DocumentId::imported();
        let parts: Vec<&str> = id.as_str().split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "imported");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2]
            .chars()
            .all(|ch| ch.is_ascii_digit() || ch.is_ascii_lowercase()));
    }

    #[test]
    fn blank_ids_fail_to_deserialize() {
        let parsed: Result<Document, _> =
            serde_json::from_str(r#"{"id":"","title":"T","content":""}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn document_serializes_as_flat_record() {
        let doc = Document::new(DocumentId::new("7").unwrap(), "T", "<b>x</b>");
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": "7", "title": "T", "content": "<b>x</b>" })
        );
    }
}
