//! Editable surface adapter.
//!
//! # Responsibility
//! - Own the live surface and the pending content snapshot.
//! - Provide the only bulk-replace path (document mount) and the read-only
//!   input path.
//!
//! # Invariants
//! - Reading input never mutates the surface or the document collection.
//! - After `mount`, the pending snapshot equals the mounted content.

use crate::model::document::{Document, DocumentId};
use crate::surface::Surface;

/// Most recent raw content read from the surface, tagged with the document
/// it belongs to. Ahead of the collection by at most one commit window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingContent {
    pub document_id: DocumentId,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct SurfaceAdapter {
    surface: Surface,
    pending: PendingContent,
}

impl SurfaceAdapter {
    /// Creates a surface showing `document`.
    pub fn mount(document: &Document) -> Self {
        let mut adapter = Self {
            surface: Surface::new(),
            pending: PendingContent {
                document_id: document.id.clone(),
                content: String::new(),
            },
        };
        adapter.load_document(document);
        adapter
    }

    /// Overwrites the surface with `document` and resets the snapshot.
    ///
    /// Undo history belongs to the previous document and is dropped.
    pub fn load_document(&mut self, document: &Document) {
        self.surface.replace_content(&document.content);
        self.surface.clear_history();
        self.pending = PendingContent {
            document_id: document.id.clone(),
            content: document.content.clone(),
        };
    }

    /// Refreshes the snapshot from the surface.
    ///
    /// Returns whether the snapshot changed.
    pub fn read_input(&mut self) -> bool {
        let current = self.surface.raw_content();
        if current == self.pending.content {
            return false;
        }
        self.pending.content = current;
        true
    }

    pub fn pending(&self) -> &PendingContent {
        &self.pending
    }

    pub fn mounted_id(&self) -> &DocumentId {
        &self.pending.document_id
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::SurfaceAdapter;
    use crate::model::document::{Document, DocumentId};

    fn doc(id: &str, content: &str) -> Document {
        Document::new(DocumentId::new(id).unwrap(), id, content)
    }

    #[test]
    fn mount_resets_pending_to_stored_content() {
        let mut adapter = SurfaceAdapter::mount(&doc("a", "<p>a</p>"));
        assert_eq!(adapter.pending().content, "<p>a</p>");
        assert_eq!(adapter.surface().raw_content(), "<p>a</p>");

        adapter.surface_mut().type_text("x").unwrap();
        adapter.load_document(&doc("b", "<p>b</p>"));
        assert_eq!(adapter.mounted_id().as_str(), "b");
        assert_eq!(adapter.pending().content, "<p>b</p>");
        assert!(!adapter.surface_mut().undo());
    }

    #[test]
    fn read_input_reports_changes_only() {
        let mut adapter = SurfaceAdapter::mount(&doc("a", ""));
        assert!(!adapter.read_input());
        adapter.surface_mut().type_text("hi").unwrap();
        assert!(adapter.read_input());
        assert_eq!(adapter.pending().content, "hi");
        assert!(!adapter.read_input());
    }
}
