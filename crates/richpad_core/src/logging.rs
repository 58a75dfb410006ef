//! Process-wide diagnostic logging.
//!
//! # Responsibility
//! - Start the rotating file logger for the editor once per process.
//! - Capture panics as a single sanitized log line.
//!
//! # Invariants
//! - A second `init_logging` with the same settings is a no-op; any other
//!   settings are rejected.
//! - Initialization never panics.
//! - Log lines carry metadata only, never document content.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const PANIC_PAYLOAD_LIMIT: usize = 160;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// File logger settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// One of `trace|debug|info|warn|error`.
    pub level: String,
    /// Absolute directory for log files.
    pub directory: PathBuf,
    pub basename: String,
    pub max_file_bytes: u64,
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            directory: PathBuf::new(),
            basename: "richpad".to_string(),
            max_file_bytes: 5 * 1024 * 1024,
            max_files: 3,
        }
    }
}

impl LogConfig {
    pub fn in_dir(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }
}

struct ActiveLogger {
    level: &'static str,
    directory: PathBuf,
    _handle: LoggerHandle,
}

/// Starts file logging.
///
/// # Errors
/// - Unknown level, or a directory that is empty, relative or not creatable.
/// - Logging already active with a different level or directory.
/// - The logger backend fails to start.
pub fn init_logging(config: &LogConfig) -> Result<(), String> {
    let level = parse_level(&config.level)?;
    let directory = check_directory(&config.directory)?;

    let active = ACTIVE_LOGGER.get_or_try_init(|| start_logger(config, level, &directory))?;
    if active.directory != directory {
        return Err(format!(
            "logging already active in `{}`; refusing to switch to `{}`",
            active.directory.display(),
            directory.display()
        ));
    }
    if active.level != level {
        return Err(format!(
            "logging already active at level `{}`; refusing to switch to `{level}`",
            active.level
        ));
    }
    Ok(())
}

/// `(level, directory)` of the active logger, if any.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE_LOGGER
        .get()
        .map(|active| (active.level, active.directory.clone()))
}

/// `debug` in debug builds, `info` in release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(config: &LogConfig, level: &'static str, directory: &Path) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(directory)
        .map_err(|err| format!("cannot create log directory `{}`: {err}", directory.display()))?;

    let handle = Logger::try_with_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?
        .log_to_file(
            FileSpec::default()
                .directory(directory)
                .basename(config.basename.as_str()),
        )
        .rotate(
            Criterion::Size(config.max_file_bytes),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config.max_files),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    install_panic_hook();
    info!(
        "event=logging_start module=logging status=ok level={level} version={} dir={}",
        env!("CARGO_PKG_VERSION"),
        directory.display()
    );

    Ok(ActiveLogger {
        level,
        directory: directory.to_path_buf(),
        _handle: handle,
    })
}

fn parse_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!("unknown log level `{other}`")),
    }
}

fn check_directory(directory: &Path) -> Result<PathBuf, String> {
    if directory.as_os_str().is_empty() {
        return Err("log directory is not set".to_string());
    }
    if !directory.is_absolute() {
        return Err(format!(
            "log directory must be absolute, got `{}`",
            directory.display()
        ));
    }
    Ok(directory.to_path_buf())
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string payload".to_string());
        error!(
            "event=panic module=logging status=error location={location} payload={}",
            single_line(&payload, PANIC_PAYLOAD_LIMIT)
        );
        previous(info);
    }));
}

fn single_line(value: &str, limit: usize) -> String {
    let flat = value.replace(['\n', '\r'], " ");
    if flat.chars().count() <= limit {
        return flat;
    }
    let mut cut: String = flat.chars().take(limit).collect();
    cut.push_str("...");
    cut
}
