//! Durable key-value storage for the document collection.
//!
//! # Responsibility
//! - Define the string-keyed storage contract used for persistence.
//! - Load and save the collection plus the active id under two keys.
//!
//! # Invariants
//! - Loading never fails: missing or corrupt data yields the default
//!   single-document collection.
//! - The collection is stored as a JSON array, the active id as a plain
//!   string.

pub mod kv;
pub mod persist;

pub use kv::{KeyValueStorage, MemoryStorage, SqliteStorage};
pub use persist::{load_store, save_store};

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    Sqlite(rusqlite::Error),
    /// Storage file was written by a newer build; nothing is read from it.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    Encode(serde_json::Error),
    /// Stored value exists but does not decode into a collection.
    Corrupt {
        key: String,
        message: String,
    },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "storage database error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "notes database schema {db_version} is newer than this editor supports ({latest_supported})"
            ),
            Self::Encode(err) => write!(f, "failed to encode documents: {err}"),
            Self::Corrupt { key, message } => write!(f, "corrupt storage entry `{key}`: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::Corrupt { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
