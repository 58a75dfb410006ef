use richpad_core::surface::{Boundary, SelectionRange};
use richpad_core::{Command, Editor, EditorConfig, KeyChord, KeyResponse, MemoryStorage};
use std::time::Duration;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[test]
fn a_typing_burst_commits_once_after_the_pause() {
    let mut editor = Editor::with_defaults(MemoryStorage::new());

    for ch in ["h", "e", "l", "l", "o"] {
        editor.type_text(ch).unwrap();
        editor.advance(ms(100));
    }
    assert_eq!(editor.stats().commits, 0);
    assert_eq!(editor.active_document().content, "");

    editor.advance(ms(400));
    assert_eq!(editor.stats().commits, 1);
    assert_eq!(editor.active_document().content, "hello");

    editor.advance(ms(5_000));
    assert_eq!(editor.stats().commits, 1);
}

#[test]
fn unchanged_input_does_not_arm_a_commit() {
    let mut editor = Editor::with_defaults(MemoryStorage::new());

    assert!(!editor.on_input());
    assert!(!editor.is_commit_pending());
    editor.run_until_idle();
    assert_eq!(editor.stats().commits, 0);
}

#[test]
fn selection_is_restored_after_the_commit() {
    let mut editor = Editor::with_defaults(MemoryStorage::new());
    editor.type_text("hello world").unwrap();
    let node = editor.surface().find_text("hello").unwrap().container;
    let caret = SelectionRange::caret(Boundary::new(node, 5));
    editor.surface_mut().set_selection(caret).unwrap();

    editor.advance(ms(500));

    assert_eq!(editor.stats().commits, 1);
    assert_eq!(editor.stats().restores, 1);
    assert_eq!(editor.stats().restore_fallbacks, 0);
    assert_eq!(editor.surface().selection(), Some(caret));
    assert_eq!(editor.surface().text_position(Boundary::new(node, 5)), Some(5));
}

#[test]
fn persistence_is_debounced_behind_commits() {
    let mut editor = Editor::with_defaults(MemoryStorage::new());

    editor.type_text("a").unwrap();
    editor.advance(ms(600));
    assert_eq!(editor.stats().commits, 1);
    editor.type_text("b").unwrap();
    editor.advance(ms(900));
    assert_eq!(editor.stats().commits, 2);
    assert_eq!(editor.stats().persists, 0);
    assert_eq!(editor.storage().write_count(), 0);

    editor.advance(ms(1_000));
    assert_eq!(editor.stats().persists, 1);
    assert_eq!(editor.storage().write_count(), 2);
}

#[test]
fn debounce_delays_come_from_config() {
    let config = EditorConfig::from_json(r#"{"commit_debounce_ms": 50}"#).unwrap();
    let mut editor = Editor::open(MemoryStorage::new(), config);

    editor.type_text("quick").unwrap();
    editor.advance(ms(50));
    assert_eq!(editor.active_document().content, "quick");
    editor.advance(ms(999));
    assert_eq!(editor.stats().persists, 0);
    editor.advance(ms(1));
    assert_eq!(editor.stats().persists, 1);
}

#[test]
fn commands_resync_and_arm_the_commit() {
    let mut editor = Editor::with_defaults(MemoryStorage::new());
    editor.type_text("bold").unwrap();
    editor.run_until_idle();
    let node = editor.surface().find_text("bold").unwrap().container;
    editor
        .surface_mut()
        .set_selection(SelectionRange::new(Boundary::new(node, 0), Boundary::new(node, 4)))
        .unwrap();

    assert_eq!(editor.handle_key(KeyChord::accel('b')), KeyResponse::Handled);
    assert_eq!(editor.pending().content, "<b>bold</b>");
    assert!(editor.is_commit_pending());

    editor.run_until_idle();
    assert_eq!(editor.active_document().content, "<b>bold</b>");
}

#[test]
fn formatting_a_collapsed_caret_changes_nothing() {
    let mut editor = Editor::with_defaults(MemoryStorage::new());
    editor.type_text("plain").unwrap();
    editor.run_until_idle();

    assert!(!editor.dispatch(Command::Italic));
    assert!(!editor.is_commit_pending());
    assert_eq!(editor.surface().raw_content(), "plain");
}

#[test]
fn undo_and_redo_shortcuts_walk_history() {
    let mut editor = Editor::with_defaults(MemoryStorage::new());
    editor.type_text("one").unwrap();
    editor.type_text(" two").unwrap();

    editor.handle_key(KeyChord::accel('z'));
    assert_eq!(editor.surface().raw_content(), "one");
    editor.handle_key(KeyChord::accel('y'));
    assert_eq!(editor.surface().raw_content(), "one two");
    assert!(editor.surface().is_focused());
}

#[test]
fn unknown_chords_are_not_intercepted() {
    let mut editor = Editor::with_defaults(MemoryStorage::new());
    assert_eq!(editor.handle_key(KeyChord::plain('s')), KeyResponse::Ignored);
    assert_eq!(editor.handle_key(KeyChord::accel('q')), KeyResponse::Ignored);
}

#[test]
fn save_shortcut_downloads_current_html() {
    let mut editor = Editor::with_defaults(MemoryStorage::new());
    editor.type_text("draft").unwrap();

    let KeyResponse::Download(file) = editor.handle_key(KeyChord::accel('s')) else {
        panic!("save should produce a download");
    };
    assert_eq!(file.file_name, "New document.html");
    assert_eq!(file.media_type, "text/html");
    assert_eq!(file.contents, "draft");
}

#[test]
fn inserts_land_at_the_caret() {
    let mut editor = Editor::with_defaults(MemoryStorage::new());
    editor.type_text("see ").unwrap();

    assert!(editor.insert_link("https://example.com", "here"));
    assert!(!editor.insert_link("", "nothing"));
    assert!(editor.insert_image("https://example.com/cat.png", ""));
    assert!(!editor.insert_local_image("not-a-data-url"));
    assert!(editor.insert_local_image("data:image/png;base64,AAAA"));

    let raw = editor.surface().raw_content();
    assert!(raw.starts_with(r#"see <a href="https://example.com" target="_blank">here</a><img"#));
    assert!(raw.contains(r#"alt="Image""#));
    assert!(raw.contains(r#"alt="Uploaded image""#));
}

#[test]
fn select_all_then_bold_or_type_covers_the_whole_document() {
    let mut editor = Editor::with_defaults(MemoryStorage::new());
    editor.type_text("hello").unwrap();
    let root = editor.surface().root();
    let all = SelectionRange::new(Boundary::new(root, 0), Boundary::new(root, 1));

    editor.surface_mut().set_selection(all).unwrap();
    assert!(editor.dispatch(Command::Bold));
    assert_eq!(editor.pending().content, "<b>hello</b>");

    editor.surface_mut().set_selection(all).unwrap();
    editor.type_text("X").unwrap();
    assert_eq!(editor.surface().text_content(), "X");

    editor.run_until_idle();
    assert_eq!(editor.active_document().content, "<b>X</b>");
}
