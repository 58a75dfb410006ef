//! Ordered document collection with an active pointer.

use crate::model::document::{Document, DocumentId};
use crate::store::{StoreError, StoreResult};

/// Id of the document created when nothing else is available.
pub const DEFAULT_DOCUMENT_ID: &str = "1";

/// Ordered, never-empty document collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentStore {
    documents: Vec<Document>,
    active_id: DocumentId,
}

impl DocumentStore {
    /// Single empty document with id `1`.
    pub fn with_default(title: &str) -> Self {
        let id = DocumentId::new(DEFAULT_DOCUMENT_ID).unwrap_or_else(DocumentId::from_timestamp);
        Self {
            documents: vec![Document::empty(id.clone(), title)],
            active_id: id,
        }
    }

    /// Rebuilds a collection from persisted parts.
    ///
    /// Returns `None` for an empty list or duplicate ids. A missing or
    /// dangling `active` falls back to the first document.
    pub fn from_parts(documents: Vec<Document>, active: Option<DocumentId>) -> Option<Self> {
        let first = documents.first()?.id.clone();
        for (idx, document) in documents.iter().enumerate() {
            if documents[..idx].iter().any(|other| other.id == document.id) {
                return None;
            }
        }
        let active_id = active
            .filter(|id| documents.iter().any(|document| &document.id == id))
            .unwrap_or(first);
        Some(Self {
            documents,
            active_id,
        })
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn active_id(&self) -> &DocumentId {
        &self.active_id
    }

    pub fn active(&self) -> &Document {
        self.get(&self.active_id)
            .unwrap_or_else(|| &self.documents[0])
    }

    pub fn get(&self, id: &DocumentId) -> Option<&Document> {
        self.documents.iter().find(|document| &document.id == id)
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.get(id).is_some()
    }

    /// Appends one document and makes it active.
    pub fn add(&mut self, document: Document) -> StoreResult<()> {
        if self.contains(&document.id) {
            return Err(StoreError::DuplicateId(document.id));
        }
        self.active_id = document.id.clone();
        self.documents.push(document);
        Ok(())
    }

    /// Appends a batch and activates its first document.
    ///
    /// Validates the whole batch before mutating anything.
    pub fn append_batch(&mut self, batch: Vec<Document>) -> StoreResult<DocumentId> {
        let first = batch.first().ok_or(StoreError::EmptyBatch)?.id.clone();
        for (idx, document) in batch.iter().enumerate() {
            if self.contains(&document.id) || batch[..idx].iter().any(|d| d.id == document.id) {
                return Err(StoreError::DuplicateId(document.id.clone()));
            }
        }
        self.documents.extend(batch);
        self.active_id = first.clone();
        Ok(first)
    }

    /// Removes one document.
    ///
    /// Deleting the active document activates the first remaining one.
    pub fn delete(&mut self, id: &DocumentId) -> StoreResult<Document> {
        let idx = self.position(id)?;
        if self.documents.len() <= 1 {
            return Err(StoreError::LastDocument(id.clone()));
        }
        let removed = self.documents.remove(idx);
        if &self.active_id == id {
            self.active_id = self.documents[0].id.clone();
        }
        Ok(removed)
    }

    pub fn set_active(&mut self, id: &DocumentId) -> StoreResult<()> {
        self.position(id)?;
        self.active_id = id.clone();
        Ok(())
    }

    /// Replaces a title. Returns whether the value changed.
    pub fn set_title(&mut self, id: &DocumentId, title: &str) -> StoreResult<bool> {
        let idx = self.position(id)?;
        let document = &mut self.documents[idx];
        if document.title == title {
            return Ok(false);
        }
        document.title = title.to_string();
        Ok(true)
    }

    /// Replaces serialized content. Returns whether the value changed.
    pub fn set_content(&mut self, id: &DocumentId, content: &str) -> StoreResult<bool> {
        let idx = self.position(id)?;
        let document = &mut self.documents[idx];
        if document.content == content {
            return Ok(false);
        }
        document.content = content.to_string();
        Ok(true)
    }

    /// Checks the non-empty and active-resolves invariants.
    pub fn is_consistent(&self) -> bool {
        !self.documents.is_empty() && self.contains(&self.active_id)
    }

    fn position(&self, id: &DocumentId) -> StoreResult<usize> {
        self.documents
            .iter()
            .position(|document| &document.id == id)
            .ok_or_else(|| StoreError::UnknownDocument(id.clone()))
    }
}
