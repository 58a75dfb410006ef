//! Editing workflow on top of the surface.
//!
//! # Responsibility
//! - Keep the live surface and the document collection in sync without
//!   losing the caret.
//! - Translate commands, shortcuts and context-menu actions into surface
//!   mutations.

pub mod adapter;
pub mod commands;
pub mod context_menu;
pub mod cursor;
pub mod keymap;
pub mod session;
pub mod table;

pub use adapter::{PendingContent, SurfaceAdapter};
pub use commands::{Command, TableSize};
pub use context_menu::{ContextMenu, MenuPosition};
pub use cursor::{RestoreOutcome, SelectionSnapshot};
pub use keymap::{KeyChord, Shortcut};
pub use session::{Editor, ImportSummary, KeyResponse, SyncStats};
pub use table::{CellLocation, TableAction, TableEditOutcome};
