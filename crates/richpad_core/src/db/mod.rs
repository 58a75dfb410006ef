//! SQLite file backing `SqliteStorage`.
//!
//! # Responsibility
//! - Open notes database connections with a busy timeout.
//! - Bring the `kv_entries` schema up to date before any entry is touched.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - Failures surface as `StorageError`, the only error storage callers see.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
