//! Collection load/save on top of `KeyValueStorage`.

use crate::config::StorageKeys;
use crate::model::document::{Document, DocumentId};
use crate::storage::{KeyValueStorage, StorageError, StorageResult};
use crate::store::DocumentStore;
use log::{debug, info, warn};

/// Loads the persisted collection.
///
/// Missing, unreadable or corrupt entries are logged and replaced by a
/// single empty document titled `default_title`.
pub fn load_store(
    storage: &impl KeyValueStorage,
    keys: &StorageKeys,
    default_title: &str,
) -> DocumentStore {
    match try_load(storage, keys) {
        Ok(Some(store)) => {
            info!(
                "event=storage_load module=storage status=ok documents={}",
                store.len()
            );
            store
        }
        Ok(None) => {
            info!("event=storage_load module=storage status=empty");
            DocumentStore::with_default(default_title)
        }
        Err(err) => {
            warn!(
                "event=storage_load module=storage status=fallback error_code=storage_load_failed error={err}"
            );
            DocumentStore::with_default(default_title)
        }
    }
}

/// Writes the collection and the active id.
pub fn save_store(
    storage: &mut impl KeyValueStorage,
    keys: &StorageKeys,
    store: &DocumentStore,
) -> StorageResult<()> {
    let encoded = serde_json::to_string(store.documents()).map_err(StorageError::Encode)?;
    storage.write(&keys.documents, &encoded)?;
    storage.write(&keys.active_id, store.active_id().as_str())?;
    debug!(
        "event=storage_save module=storage status=ok documents={} bytes={}",
        store.len(),
        encoded.len()
    );
    Ok(())
}

fn try_load(
    storage: &impl KeyValueStorage,
    keys: &StorageKeys,
) -> StorageResult<Option<DocumentStore>> {
    let Some(raw) = storage.read(&keys.documents)? else {
        return Ok(None);
    };
    let documents: Vec<Document> =
        serde_json::from_str(&raw).map_err(|err| StorageError::Corrupt {
            key: keys.documents.clone(),
            message: err.to_string(),
        })?;
    if documents.is_empty() {
        return Ok(None);
    }
    let active = storage.read(&keys.active_id)?.and_then(DocumentId::new);
    DocumentStore::from_parts(documents, active)
        .map(Some)
        .ok_or_else(|| StorageError::Corrupt {
            key: keys.documents.clone(),
            message: "duplicate document ids".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::{load_store, save_store};
    use crate::config::StorageKeys;
    use crate::model::document::{Document, DocumentId};
    use crate::storage::{KeyValueStorage, MemoryStorage};
    use crate::store::DocumentStore;

    #[test]
    fn save_then_load_round_trips_documents_and_active_id() {
        let keys = StorageKeys::default();
        let mut storage = MemoryStorage::new();
        let mut store = DocumentStore::with_default("New document");
        store
            .add(Document::new(DocumentId::new("2").unwrap(), "Two", "<p>2</p>"))
            .unwrap();

        save_store(&mut storage, &keys, &store).unwrap();
        assert_eq!(storage.read(&keys.active_id).unwrap().as_deref(), Some("2"));

        let loaded = load_store(&storage, &keys, "ignored");
        assert_eq!(loaded, store);
    }

    #[test]
    fn corrupt_or_empty_entries_fall_back_to_default() {
        let keys = StorageKeys::default();
        for raw in ["{not json", "[]", "{\"notes\": []}", "[{\"id\": \"1\"}]"] {
            let mut storage = MemoryStorage::new();
            storage.write(&keys.documents, raw).unwrap();
            let store = load_store(&storage, &keys, "New document");
            assert_eq!(store.len(), 1, "input {raw}");
            assert_eq!(store.active().title, "New document");
        }
    }

    #[test]
    fn unknown_active_id_selects_first_document() {
        let keys = StorageKeys::default();
        let mut storage = MemoryStorage::new();
        storage
            .write(
                &keys.documents,
                r#"[{"id":"a","title":"A","content":""},{"id":"b","title":"B","content":""}]"#,
            )
            .unwrap();
        storage.write(&keys.active_id, "missing").unwrap();

        let store = load_store(&storage, &keys, "New document");
        assert_eq!(store.active_id().as_str(), "a");
    }
}
