//! Export and import of documents.
//!
//! # Responsibility
//! - Build downloadable HTML, plain-text and JSON backup files.
//! - Validate JSON backups and turn their entries into fresh documents.
//!
//! # Invariants
//! - Import validation happens before any collection mutation; a rejected
//!   backup leaves state untouched.
//! - Imported documents never reuse an id already in the collection.

pub mod export;
pub mod import;

pub use export::{export_backup, export_html, export_text, Backup, ExportFile};
pub use import::{parse_backup, ImportError, ImportedBatch};

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum TransferError {
    Encode(serde_json::Error),
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode backup: {err}"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for TransferError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}
