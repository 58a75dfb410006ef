use richpad_core::storage::KeyValueStorage;
use richpad_core::{DocumentId, Editor, MemoryStorage, SqliteStorage, StoreError};

fn id(value: &str) -> DocumentId {
    DocumentId::new(value).unwrap()
}

#[test]
fn empty_storage_opens_default_document() {
    let editor = Editor::with_defaults(MemoryStorage::new());

    assert_eq!(editor.store().len(), 1);
    assert_eq!(editor.active_document().id.as_str(), "1");
    assert_eq!(editor.active_document().title, "New document");
    assert_eq!(editor.surface().raw_content(), "");
}

#[test]
fn corrupt_storage_falls_back_to_default() {
    let mut storage = MemoryStorage::new();
    storage.write("textEditorNotes", "{broken").unwrap();

    let editor = Editor::with_defaults(storage);
    assert_eq!(editor.store().len(), 1);
    assert_eq!(editor.active_document().id.as_str(), "1");
}

#[test]
fn stored_active_id_is_honored_only_when_it_exists() {
    let notes = r#"[{"id":"a","title":"A","content":"<p>a</p>"},{"id":"b","title":"B","content":"<p>b</p>"}]"#;

    let mut storage = MemoryStorage::new();
    storage.write("textEditorNotes", notes).unwrap();
    storage.write("textEditorCurrentNoteId", "b").unwrap();
    let editor = Editor::with_defaults(storage);
    assert_eq!(editor.active_document().id.as_str(), "b");
    assert_eq!(editor.surface().raw_content(), "<p>b</p>");

    let mut storage = MemoryStorage::new();
    storage.write("textEditorNotes", notes).unwrap();
    storage.write("textEditorCurrentNoteId", "gone").unwrap();
    let editor = Editor::with_defaults(storage);
    assert_eq!(editor.active_document().id.as_str(), "a");
}

#[test]
fn added_documents_are_numbered_and_activated() {
    let mut editor = Editor::with_defaults(MemoryStorage::new());

    let added = editor.add_document().unwrap();
    assert_eq!(editor.store().len(), 2);
    assert_eq!(editor.store().active_id(), &added);
    assert_eq!(editor.active_document().title, "Document 2");
    assert_eq!(editor.surface().raw_content(), "");
    assert!(editor.store().is_consistent());
}

#[test]
fn deleting_the_last_document_is_refused() {
    let mut editor = Editor::with_defaults(MemoryStorage::new());
    editor.type_text("keep me").unwrap();

    let err = editor.delete_document(&id("1")).unwrap_err();
    assert_eq!(err, StoreError::LastDocument(id("1")));
    assert_eq!(editor.store().len(), 1);
    assert_eq!(editor.surface().raw_content(), "keep me");
}

#[test]
fn deleting_the_active_document_mounts_the_first_remaining() {
    let mut editor = Editor::with_defaults(MemoryStorage::new());
    editor.type_text("first").unwrap();
    let second = editor.add_document().unwrap();
    editor.type_text("discarded").unwrap();

    editor.delete_document(&second).unwrap();
    assert_eq!(editor.store().active_id(), &id("1"));
    assert_eq!(editor.surface().raw_content(), "first");
    assert!(!editor.is_commit_pending());
    assert!(editor.store().is_consistent());
}

#[test]
fn deleting_an_unknown_document_reports_it() {
    let mut editor = Editor::with_defaults(MemoryStorage::new());
    editor.add_document().unwrap();

    let err = editor.delete_document(&id("missing")).unwrap_err();
    assert_eq!(err, StoreError::UnknownDocument(id("missing")));
    assert_eq!(editor.store().len(), 2);
}

#[test]
fn switching_flushes_pending_content_into_its_own_document() {
    let mut editor = Editor::with_defaults(MemoryStorage::new());
    editor.type_text("abc").unwrap();
    let second = editor.add_document().unwrap();
    assert_eq!(editor.store().get(&id("1")).unwrap().content, "abc");

    editor.type_text("xyz").unwrap();
    editor.switch_document(&id("1")).unwrap();

    assert_eq!(editor.store().get(&second).unwrap().content, "xyz");
    assert_eq!(editor.store().get(&id("1")).unwrap().content, "abc");
    assert_eq!(editor.surface().raw_content(), "abc");
    assert_eq!(editor.pending().document_id, id("1"));

    editor.run_until_idle();
    assert_eq!(editor.store().get(&second).unwrap().content, "xyz");
    assert_eq!(editor.stats().commits, 0);
}

#[test]
fn switching_to_the_active_document_is_a_no_op() {
    let mut editor = Editor::with_defaults(MemoryStorage::new());
    editor.type_text("draft").unwrap();

    editor.switch_document(&id("1")).unwrap();
    assert!(editor.is_commit_pending());
    assert!(matches!(
        editor.switch_document(&id("nope")),
        Err(StoreError::UnknownDocument(_))
    ));
}

#[test]
fn rename_touches_only_the_active_title() {
    let mut editor = Editor::with_defaults(MemoryStorage::new());
    editor.add_document().unwrap();

    assert!(editor.rename_active("Groceries"));
    assert!(!editor.rename_active("Groceries"));
    assert_eq!(editor.active_document().title, "Groceries");
    assert_eq!(editor.store().get(&id("1")).unwrap().title, "New document");
}

#[test]
fn sqlite_storage_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");

    let mut editor = Editor::with_defaults(SqliteStorage::open(&path).unwrap());
    editor.type_text("persisted").unwrap();
    editor.rename_active("Journal");
    editor.flush();
    drop(editor);

    let reopened = Editor::with_defaults(SqliteStorage::open(&path).unwrap());
    assert_eq!(reopened.active_document().title, "Journal");
    assert_eq!(reopened.active_document().content, "persisted");
    assert_eq!(reopened.surface().raw_content(), "persisted");
}
