//! In-memory document collection.
//!
//! # Responsibility
//! - Own the ordered document list and the active-document pointer.
//! - Enforce collection invariants on every mutation.
//!
//! # Invariants
//! - The collection is never empty.
//! - `active_id` always references an existing document.
//! - Order is insertion order; imported documents are appended.

pub mod collection;

pub use collection::DocumentStore;

use crate::model::document::DocumentId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Rejected collection mutation. The collection is untouched when returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    UnknownDocument(DocumentId),
    /// Deleting the only remaining document.
    LastDocument(DocumentId),
    DuplicateId(DocumentId),
    /// Bulk insert with nothing to insert.
    EmptyBatch,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownDocument(id) => write!(f, "document not found: {id}"),
            Self::LastDocument(id) => {
                write!(f, "refusing to delete `{id}`: it is the last document")
            }
            Self::DuplicateId(id) => write!(f, "document id already exists: {id}"),
            Self::EmptyBatch => write!(f, "no documents to insert"),
        }
    }
}

impl Error for StoreError {}
