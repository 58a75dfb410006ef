//! JSON backup import.

use crate::model::document::{Document, DocumentId};
use crate::store::{DocumentStore, StoreError};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Import rejection, shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    MalformedJson(String),
    /// Top level is not an object with a non-empty `notes` array.
    MissingNotes,
    /// Every entry failed validation.
    NoValidNotes,
    /// Validated batch could not be appended to the collection.
    Conflict(StoreError),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedJson(message) => {
                write!(f, "Could not read the JSON file, check its format: {message}")
            }
            Self::MissingNotes => write!(
                f,
                "Invalid JSON file format: expected an object with a notes array."
            ),
            Self::NoValidNotes => write!(f, "No valid notes found in the file."),
            Self::Conflict(err) => write!(f, "Could not add the imported notes: {err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Conflict(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ImportError {
    fn from(value: StoreError) -> Self {
        Self::Conflict(value)
    }
}

/// Validated documents ready to append, with fresh ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedBatch {
    pub documents: Vec<Document>,
    /// Entries dropped by validation.
    pub dropped: usize,
}

/// Validates a backup and re-keys its valid entries against `existing`.
///
/// An entry is valid when it is an object with a truthy `id` and both
/// `title` and `content` keys present (any value, `null` included).
pub fn parse_backup(json: &str, existing: &DocumentStore) -> Result<ImportedBatch, ImportError> {
    let root: Value =
        serde_json::from_str(json).map_err(|err| ImportError::MalformedJson(err.to_string()))?;
    let entries = root
        .get("notes")
        .and_then(Value::as_array)
        .filter(|notes| !notes.is_empty())
        .ok_or(ImportError::MissingNotes)?;

    let mut documents: Vec<Document> = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some((title, content)) = entry.as_object().and_then(validate_entry) else {
            continue;
        };
        let id = fresh_id(existing, &documents);
        documents.push(Document::new(id, title, content));
    }

    if documents.is_empty() {
        return Err(ImportError::NoValidNotes);
    }
    Ok(ImportedBatch {
        dropped: entries.len() - documents.len(),
        documents,
    })
}

fn validate_entry(entry: &Map<String, Value>) -> Option<(String, String)> {
    if !entry.get("id").is_some_and(is_truthy) {
        return None;
    }
    let title = field_text(entry.get("title")?);
    let content = field_text(entry.get("content")?);
    Some((title, content))
}

/// Truthiness of a loosely typed id: empty strings, zero, `false` and
/// `null` do not identify anything.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Present-but-odd fields are kept: `null` becomes empty, other non-strings
/// keep their JSON text.
fn field_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn fresh_id(existing: &DocumentStore, batch: &[Document]) -> DocumentId {
    loop {
        let candidate = DocumentId::imported();
        if !existing.contains(&candidate) && batch.iter().all(|doc| doc.id != candidate) {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_backup, ImportError};
    use crate::store::DocumentStore;

    #[test]
    fn invalid_entries_are_dropped_and_ids_regenerated() {
        let store = DocumentStore::with_default("New document");
        let json = r#"{
            "notes": [
                {"id": "1", "title": "A", "content": "<p>a</p>"},
                {"id": "", "title": "B", "content": ""},
                {"id": "x", "title": "C", "content": ""},
                {"id": "y", "content": "missing title"},
                {"id": 5, "title": "D", "content": "d"}
            ]
        }"#;
        let batch = parse_backup(json, &store).unwrap();
        assert_eq!(batch.documents.len(), 3);
        assert_eq!(batch.dropped, 2);
        assert!(batch
            .documents
            .iter()
            .all(|doc| doc.id.as_str().starts_with("imported_") && !store.contains(&doc.id)));
        assert_eq!(batch.documents[0].title, "A");
    }

    #[test]
    fn loosely_typed_fields_are_accepted() {
        let store = DocumentStore::with_default("New document");
        let json = r#"{"notes": [
            {"id": "a", "title": null, "content": "<p>a</p>"},
            {"id": "b", "title": 5, "content": null},
            {"id": true, "title": "t", "content": ""},
            {"id": {"legacy": 1}, "title": "obj", "content": ""},
            {"id": false, "title": "f", "content": ""},
            {"id": 0, "title": "zero", "content": ""},
            {"id": null, "title": "n", "content": ""}
        ]}"#;

        let batch = parse_backup(json, &store).unwrap();
        let fields: Vec<(&str, &str)> = batch
            .documents
            .iter()
            .map(|doc| (doc.title.as_str(), doc.content.as_str()))
            .collect();
        assert_eq!(
            fields,
            vec![("", "<p>a</p>"), ("5", ""), ("t", ""), ("obj", "")]
        );
        assert_eq!(batch.dropped, 3);
    }

    #[test]
    fn shape_errors_are_reported() {
        let store = DocumentStore::with_default("New document");
        assert!(matches!(
            parse_backup("{oops", &store),
            Err(ImportError::MalformedJson(_))
        ));
        assert_eq!(parse_backup("[]", &store), Err(ImportError::MissingNotes));
        assert_eq!(
            parse_backup(r#"{"notes": []}"#, &store),
            Err(ImportError::MissingNotes)
        );
        assert_eq!(
            parse_backup(r#"{"notes": [{"title": "no id", "content": ""}]}"#, &store),
            Err(ImportError::NoValidNotes)
        );
    }
}
