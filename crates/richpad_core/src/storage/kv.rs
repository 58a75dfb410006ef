//! Key-value storage contract and implementations.

use crate::db::{open_db, open_db_in_memory};
use crate::storage::StorageResult;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;

/// String-keyed durable storage, the shape of browser local storage.
pub trait KeyValueStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> StorageResult<()>;
}

/// Process-local storage, mainly for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl KeyValueStorage for MemoryStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// SQLite-backed storage over the `kv_entries` table.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (and migrates) a storage file.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }
}

impl KeyValueStorage for SqliteStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}
