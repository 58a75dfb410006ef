//! Core of a multi-document rich-text notes editor.
//! Owns the document collection, the editable surface and their
//! synchronization; hosts drive it through `Editor`.

pub mod config;
pub mod db;
pub mod editor;
pub mod logging;
pub mod model;
pub mod schedule;
pub mod storage;
pub mod store;
pub mod surface;
pub mod transfer;

pub use config::{EditorConfig, StorageKeys};
pub use editor::{
    Command, Editor, ImportSummary, KeyChord, KeyResponse, MenuPosition, SyncStats, TableAction,
    TableEditOutcome,
};
pub use logging::{default_log_level, init_logging, logging_status, LogConfig};
pub use model::document::{Document, DocumentId};
pub use storage::{KeyValueStorage, MemoryStorage, SqliteStorage, StorageError};
pub use store::{DocumentStore, StoreError};
pub use surface::{Surface, SurfaceError};
pub use transfer::{ExportFile, ImportError, TransferError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
