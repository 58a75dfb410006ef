//! Editor session: document collection, live surface and timers wired
//! together.
//!
//! # Responsibility
//! - Route input, commands and structural edits to the surface.
//! - Run the debounced commit cycle (capture, commit, restore next tick).
//! - Debounce persistence of the collection to durable storage.
//!
//! # Invariants
//! - Content is only ever committed into the document it was read from.
//! - Switching, exporting and importing flush a pending commit first.
//! - At most one commit runs per input burst; at most one persist runs per
//!   mutation burst.

use crate::config::EditorConfig;
use crate::editor::adapter::{PendingContent, SurfaceAdapter};
use crate::editor::commands::{
    self, image_markup, link_markup, local_image_markup, table_markup, Command, TableSize,
};
use crate::editor::context_menu::{ContextMenu, MenuPosition};
use crate::editor::cursor::{self, RestoreOutcome, SelectionSnapshot};
use crate::editor::keymap::{shortcut_for, KeyChord, Shortcut};
use crate::editor::table::{self, TableAction, TableEditOutcome};
use crate::model::document::{Document, DocumentId};
use crate::schedule::{DebounceTicket, Debouncer, Scheduler};
use crate::storage::{load_store, save_store, KeyValueStorage};
use crate::store::{DocumentStore, StoreError, StoreResult};
use crate::surface::{NodeId, Surface, SurfaceResult};
use crate::transfer::{self, parse_backup, ExportFile, ImportError, TransferError};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
enum EditorTask {
    Commit(DebounceTicket),
    Persist(DebounceTicket),
    RestoreSelection(SelectionSnapshot),
}

/// Counters for the synchronization cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Debounced commit cycles that ran.
    pub commits: usize,
    pub restores: usize,
    /// Restores that fell back to a caret at end of content.
    pub restore_fallbacks: usize,
    pub persists: usize,
    pub persist_failures: usize,
}

/// Outcome of a handled key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResponse {
    /// Not a shortcut; the host keeps its default behavior.
    Ignored,
    Handled,
    /// Save shortcut: hand the file to the host for download.
    Download(ExportFile),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub dropped: usize,
    /// First imported document, now active.
    pub active: DocumentId,
}

pub struct Editor<S: KeyValueStorage> {
    config: EditorConfig,
    storage: S,
    store: DocumentStore,
    adapter: SurfaceAdapter,
    context_menu: ContextMenu,
    scheduler: Scheduler<EditorTask>,
    commit_timer: Debouncer,
    persist_timer: Debouncer,
    stats: SyncStats,
}

impl<S: KeyValueStorage> Editor<S> {
    /// Loads the collection from `storage` and mounts the active document.
    pub fn open(storage: S, config: EditorConfig) -> Self {
        let store = load_store(&storage, &config.storage_keys, &config.default_title);
        let adapter = SurfaceAdapter::mount(store.active());
        info!(
            "event=editor_open module=editor status=ok documents={} active={}",
            store.len(),
            store.active_id()
        );
        Self {
            commit_timer: Debouncer::new(config.commit_debounce()),
            persist_timer: Debouncer::new(config.persist_debounce()),
            config,
            storage,
            store,
            adapter,
            context_menu: ContextMenu::default(),
            scheduler: Scheduler::new(),
            stats: SyncStats::default(),
        }
    }

    /// Opens a session with the default debounce delays and storage keys.
    pub fn with_defaults(storage: S) -> Self {
        Self::open(storage, EditorConfig::default())
    }

    /// Settings the session was opened with.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Committed document collection. Typing not yet committed lives in
    /// `pending`.
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Backing key-value storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Committed state of the document shown on the surface.
    pub fn active_document(&self) -> &Document {
        self.store.active()
    }

    /// Latest surface content, tagged with the document it belongs to.
    pub fn pending(&self) -> &PendingContent {
        self.adapter.pending()
    }

    /// Live editable surface.
    pub fn surface(&self) -> &Surface {
        self.adapter.surface()
    }

    /// Direct access for host-driven edits; call `on_input` afterwards.
    pub fn surface_mut(&mut self) -> &mut Surface {
        self.adapter.surface_mut()
    }

    /// Current table context menu state.
    pub fn context_menu(&self) -> &ContextMenu {
        &self.context_menu
    }

    /// Commit, restore and persist counters since the session opened.
    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Virtual time elapsed since the session opened.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Whether a debounced commit is waiting to fire.
    pub fn is_commit_pending(&self) -> bool {
        self.commit_timer.is_armed()
    }

    /// Whether a debounced storage write is waiting to fire.
    pub fn is_persist_pending(&self) -> bool {
        self.persist_timer.is_armed()
    }

    /// Input event from the surface.
    ///
    /// Re-reads the surface and (re)arms the commit timer when the content
    /// actually changed. Returns whether it changed.
    pub fn on_input(&mut self) -> bool {
        let changed = self.adapter.read_input();
        if changed {
            self.arm_commit();
        }
        changed
    }

    /// Types `text` at the caret and reports it as input.
    pub fn type_text(&mut self, text: &str) -> SurfaceResult<bool> {
        self.adapter.surface_mut().type_text(text)?;
        Ok(self.on_input())
    }

    /// Runs every task due within the next `elapsed` of virtual time.
    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.scheduler.now() + elapsed;
        while let Some(task) = self.scheduler.pop_due(until) {
            self.run_task(task);
        }
        self.scheduler.advance_clock_to(until);
    }

    /// Runs tasks until nothing is scheduled.
    pub fn run_until_idle(&mut self) {
        while let Some(due) = self.scheduler.next_due() {
            if let Some(task) = self.scheduler.pop_due(due) {
                self.run_task(task);
            }
        }
    }

    /// Commits pending content and writes the collection immediately.
    pub fn flush(&mut self) {
        self.flush_commit();
        self.persist_timer.disarm();
        self.persist_now();
    }

    /// Mounts another document after committing pending content into the
    /// current one. Switching to the active document does nothing.
    ///
    /// # Errors
    /// - `UnknownDocument` when `id` is not in the collection.
    pub fn switch_document(&mut self, id: &DocumentId) -> StoreResult<()> {
        if self.store.active_id() == id {
            return Ok(());
        }
        if !self.store.contains(id) {
            return Err(StoreError::UnknownDocument(id.clone()));
        }
        self.flush_commit();
        self.store.set_active(id)?;
        self.mount_active();
        self.schedule_persist();
        debug!("event=document_switch module=editor status=ok active={id}");
        Ok(())
    }

    /// Appends an empty document titled `<prefix> <n+1>` and activates it.
    pub fn add_document(&mut self) -> StoreResult<DocumentId> {
        self.flush_commit();
        let id = self.fresh_document_id();
        let title = format!("{} {}", self.config.new_title_prefix, self.store.len() + 1);
        self.store.add(Document::empty(id.clone(), title))?;
        self.mount_active();
        self.schedule_persist();
        debug!("event=document_add module=editor status=ok id={id}");
        Ok(id)
    }

    /// Removes a document. The last remaining document cannot be deleted.
    pub fn delete_document(&mut self, id: &DocumentId) -> StoreResult<()> {
        let was_active = self.store.active_id() == id;
        if let Err(err) = self.store.delete(id) {
            info!("event=document_delete module=editor status=refused id={id} reason={err}");
            return Err(err);
        }
        if was_active {
            // Pending content belonged to the deleted document.
            self.commit_timer.disarm();
            self.mount_active();
        }
        self.schedule_persist();
        debug!(
            "event=document_delete module=editor status=ok id={id} active={}",
            self.store.active_id()
        );
        Ok(())
    }

    /// Sets the active document title. Returns whether it changed.
    pub fn rename_active(&mut self, title: &str) -> bool {
        let id = self.store.active_id().clone();
        match self.store.set_title(&id, title) {
            Ok(true) => {
                self.schedule_persist();
                true
            }
            Ok(false) => false,
            Err(err) => {
                warn!("event=document_rename module=editor status=error error={err}");
                false
            }
        }
    }

    /// Runs a formatting or insert command at the caret.
    pub fn dispatch(&mut self, command: Command) -> bool {
        self.context_menu.close();
        let changed = commands::apply(&mut self.adapter, &command);
        if changed {
            self.arm_commit();
        }
        changed
    }

    /// Inserts a table from raw dialog values.
    pub fn insert_table(&mut self, rows: &str, cols: &str) -> bool {
        let markup = table_markup(TableSize::from_dialog(rows, cols));
        self.dispatch(Command::InsertMarkup(markup))
    }

    /// Inserts a link opening in a new target. Both values are required;
    /// returns `false` without touching the surface otherwise.
    pub fn insert_link(&mut self, url: &str, text: &str) -> bool {
        match link_markup(url, text) {
            Some(markup) => self.dispatch(Command::InsertMarkup(markup)),
            None => false,
        }
    }

    /// Inserts an image by URL; an empty `alt` falls back to a generic label.
    pub fn insert_image(&mut self, url: &str, alt: &str) -> bool {
        match image_markup(url, alt) {
            Some(markup) => self.dispatch(Command::InsertMarkup(markup)),
            None => false,
        }
    }

    /// Inserts a locally read image given as a `data:` URL.
    pub fn insert_local_image(&mut self, data_url: &str) -> bool {
        match local_image_markup(data_url) {
            Some(markup) => self.dispatch(Command::InsertMarkup(markup)),
            None => false,
        }
    }

    /// Right-click on `clicked`. Returns whether the table menu is shown.
    pub fn open_context_menu(&mut self, clicked: NodeId, position: MenuPosition) -> bool {
        self.context_menu
            .on_context_click(self.adapter.surface(), clicked, position)
    }

    /// Hides the table menu and forgets its target.
    pub fn close_context_menu(&mut self) {
        self.context_menu.close();
    }

    /// Click anywhere in the document.
    pub fn on_document_click(&mut self) {
        self.context_menu.close();
    }

    /// Applies a table action to the cell captured by the open menu.
    ///
    /// The menu closes whatever the outcome.
    pub fn apply_table_action(&mut self, action: TableAction) -> TableEditOutcome {
        let Some(target) = self.context_menu.take_target() else {
            return TableEditOutcome::TargetMissing;
        };
        match table::apply_action(self.adapter.surface_mut(), target, action) {
            Ok(outcome) => {
                if outcome == TableEditOutcome::Applied && self.adapter.read_input() {
                    self.arm_commit();
                }
                outcome
            }
            Err(err) => {
                warn!(
                    "event=table_edit module=editor status=error action={} error={err}",
                    action.name()
                );
                TableEditOutcome::TargetMissing
            }
        }
    }

    /// Runs the shortcut bound to `chord`.
    ///
    /// Save returns the active document as an HTML download; formatting and
    /// history shortcuts act on the surface. Other chords are `Ignored`.
    pub fn handle_key(&mut self, chord: KeyChord) -> KeyResponse {
        let Some(shortcut) = shortcut_for(chord) else {
            return KeyResponse::Ignored;
        };
        let command = match shortcut {
            Shortcut::Save => return KeyResponse::Download(self.export_html()),
            Shortcut::Bold => Command::Bold,
            Shortcut::Italic => Command::Italic,
            Shortcut::Underline => Command::Underline,
            Shortcut::Undo => Command::Undo,
            Shortcut::Redo => Command::Redo,
        };
        self.dispatch(command);
        KeyResponse::Handled
    }

    /// Active document as raw markup, `<title>.html`.
    pub fn export_html(&mut self) -> ExportFile {
        self.flush_commit();
        transfer::export_html(self.store.active())
    }

    /// Active document without markup, `<title>.txt`.
    pub fn export_text(&mut self) -> ExportFile {
        self.flush_commit();
        transfer::export_text(self.store.active())
    }

    /// JSON backup of the whole collection, stamped with the current time.
    pub fn export_backup(&mut self) -> Result<ExportFile, TransferError> {
        self.export_backup_at(Utc::now())
    }

    /// JSON backup stamped with `exported_at`. Pending content is committed
    /// first.
    ///
    /// # Errors
    /// - `TransferError::Encode` when serialization fails.
    pub fn export_backup_at(&mut self, exported_at: DateTime<Utc>) -> Result<ExportFile, TransferError> {
        self.flush_commit();
        transfer::export_backup(&self.store, exported_at)
    }

    /// Appends the valid entries of a JSON backup and activates the first.
    ///
    /// # Errors
    /// Returns the user-facing `ImportError`; the collection is unchanged.
    pub fn import_backup(&mut self, json: &str) -> Result<ImportSummary, ImportError> {
        self.flush_commit();
        let batch = parse_backup(json, &self.store).map_err(|err| {
            warn!("event=import module=editor status=rejected reason={err}");
            err
        })?;
        let imported = batch.documents.len();
        let active = self.store.append_batch(batch.documents)?;
        self.mount_active();
        self.schedule_persist();
        info!(
            "event=import module=editor status=ok imported={imported} dropped={} active={active}",
            batch.dropped
        );
        Ok(ImportSummary {
            imported,
            dropped: batch.dropped,
            active,
        })
    }

    fn run_task(&mut self, task: EditorTask) {
        match task {
            EditorTask::Commit(ticket) => {
                if self.commit_timer.fire(ticket) {
                    self.commit_cycle();
                }
            }
            EditorTask::Persist(ticket) => {
                if self.persist_timer.fire(ticket) {
                    self.persist_now();
                }
            }
            EditorTask::RestoreSelection(snapshot) => {
                match cursor::restore(self.adapter.surface_mut(), &snapshot) {
                    RestoreOutcome::Restored => self.stats.restores += 1,
                    RestoreOutcome::MovedToEnd => self.stats.restore_fallbacks += 1,
                }
            }
        }
    }

    fn arm_commit(&mut self) {
        let ticket = self.commit_timer.arm();
        self.scheduler
            .schedule(self.commit_timer.delay(), EditorTask::Commit(ticket));
    }

    fn schedule_persist(&mut self) {
        let ticket = self.persist_timer.arm();
        self.scheduler
            .schedule(self.persist_timer.delay(), EditorTask::Persist(ticket));
    }

    /// Capture, commit, then restore on the following tick.
    fn commit_cycle(&mut self) {
        let snapshot = cursor::capture(self.adapter.surface());
        self.commit_pending();
        self.stats.commits += 1;
        if let Some(snapshot) = snapshot {
            self.scheduler.next_tick(EditorTask::RestoreSelection(snapshot));
        }
    }

    fn flush_commit(&mut self) {
        self.commit_timer.disarm();
        self.commit_pending();
    }

    fn commit_pending(&mut self) {
        let pending = self.adapter.pending();
        match self.store.set_content(&pending.document_id, &pending.content) {
            Ok(changed) => {
                debug!(
                    "event=content_commit module=editor status=ok document={} changed={changed}",
                    pending.document_id
                );
                if changed {
                    self.schedule_persist();
                }
            }
            Err(err) => {
                warn!("event=content_commit module=editor status=dropped error={err}");
            }
        }
    }

    fn persist_now(&mut self) {
        match save_store(&mut self.storage, &self.config.storage_keys, &self.store) {
            Ok(()) => self.stats.persists += 1,
            Err(err) => {
                self.stats.persist_failures += 1;
                error!(
                    "event=storage_save module=editor status=error error_code=storage_save_failed error={err}"
                );
            }
        }
    }

    fn mount_active(&mut self) {
        self.adapter.load_document(self.store.active());
        self.context_menu.close();
    }

    fn fresh_document_id(&self) -> DocumentId {
        let base = DocumentId::from_timestamp();
        if !self.store.contains(&base) {
            return base;
        }
        (1..)
            .filter_map(|n| DocumentId::new(format!("{base}-{n}")))
            .find(|candidate| !self.store.contains(candidate))
            .unwrap_or(base)
    }
}
