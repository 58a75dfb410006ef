//! CLI smoke entry point.
//!
//! # Responsibility
//! - Drive one editing session end to end against in-memory storage.
//! - Print the resulting JSON backup for quick local sanity checks.
//!
//! Set `RICHPAD_LOG_DIR` to an absolute directory to also write log files.

use richpad_core::{
    core_version, init_logging, Editor, KeyChord, KeyResponse, LogConfig, MemoryStorage,
};
use std::process::ExitCode;
use std::time::Duration;

fn main() -> ExitCode {
    if let Ok(dir) = std::env::var("RICHPAD_LOG_DIR") {
        if let Err(err) = init_logging(&LogConfig::in_dir(dir)) {
            eprintln!("logging disabled: {err}");
        }
    }

    let mut editor = Editor::with_defaults(MemoryStorage::new());
    if let Err(err) = editor.type_text("Hello from richpad") {
        eprintln!("typing failed: {err}");
        return ExitCode::FAILURE;
    }
    editor.insert_table("2", "2");
    editor.advance(Duration::from_secs(2));

    if let KeyResponse::Download(file) = editor.handle_key(KeyChord::accel('s')) {
        println!("saved {} ({}, {} bytes)", file.file_name, file.media_type, file.contents.len());
    }

    match editor.export_backup() {
        Ok(file) => {
            log::info!("event=cli_probe module=cli status=ok version={}", core_version());
            println!("richpad_core version={}", core_version());
            println!("{}", file.contents);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("export failed: {err}");
            ExitCode::FAILURE
        }
    }
}
