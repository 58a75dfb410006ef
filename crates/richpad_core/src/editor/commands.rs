//! Command dispatcher and insert markup builders.
//!
//! # Responsibility
//! - Apply formatting and insertion commands at the current caret.
//! - Re-sync the pending snapshot synchronously after every command.
//!
//! # Invariants
//! - A command always runs against a focused surface; focus is restored
//!   first when it was lost.
//! - Commands are fire-and-forget: failures are logged, never returned.

use crate::editor::adapter::SurfaceAdapter;
use crate::surface::markup::{escape_attr, escape_text};
use crate::surface::InlineFormat;
use log::{debug, warn};

const DEFAULT_TABLE_DIMENSION: usize = 3;
const TABLE_ATTRS: &str = r#"border="1" style="border-collapse: collapse; width: 100%; margin: 10px 0;" class="editable-table""#;
const INSERTED_CELL_STYLE: &str = "padding: 8px; border: 1px solid #ccc; position: relative;";
const IMAGE_STYLE: &str = "max-width: 100%; height: auto; margin: 10px 0;";
const DEFAULT_IMAGE_ALT: &str = "Image";
const LOCAL_IMAGE_ALT: &str = "Uploaded image";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Bold,
    Italic,
    Underline,
    Undo,
    Redo,
    /// Insert a markup fragment at the caret (tables, links, images).
    InsertMarkup(String),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underline => "underline",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::InsertMarkup(_) => "insert_markup",
        }
    }
}

/// Applies `command` and re-reads the surface.
///
/// Returns whether the pending snapshot changed.
pub fn apply(adapter: &mut SurfaceAdapter, command: &Command) -> bool {
    let surface = adapter.surface_mut();
    if !surface.is_focused() {
        surface.focus();
    }

    let result = match command {
        Command::Bold => surface.toggle_inline(InlineFormat::Bold).map(|_| ()),
        Command::Italic => surface.toggle_inline(InlineFormat::Italic).map(|_| ()),
        Command::Underline => surface.toggle_inline(InlineFormat::Underline).map(|_| ()),
        Command::Undo => {
            surface.undo();
            Ok(())
        }
        Command::Redo => {
            surface.redo();
            Ok(())
        }
        Command::InsertMarkup(markup) => surface.insert_markup(markup),
    };
    if let Err(err) = result {
        warn!(
            "event=command_apply module=editor status=error command={} error={err}",
            command.name()
        );
    }

    let changed = adapter.read_input();
    debug!(
        "event=command_apply module=editor status=ok command={} changed={changed}",
        command.name()
    );
    changed
}

/// Table dimensions as entered in the insert-table dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSize {
    pub rows: usize,
    pub cols: usize,
}

impl Default for TableSize {
    fn default() -> Self {
        Self {
            rows: DEFAULT_TABLE_DIMENSION,
            cols: DEFAULT_TABLE_DIMENSION,
        }
    }
}

impl TableSize {
    /// Parses dialog strings; anything without a positive leading integer
    /// falls back to 3.
    pub fn from_dialog(rows: &str, cols: &str) -> Self {
        Self {
            rows: leading_positive_int(rows).unwrap_or(DEFAULT_TABLE_DIMENSION),
            cols: leading_positive_int(cols).unwrap_or(DEFAULT_TABLE_DIMENSION),
        }
    }
}

pub fn table_markup(size: TableSize) -> String {
    let cell = format!(r#"<td style="{INSERTED_CELL_STYLE}">&nbsp;</td>"#);
    let row = format!("<tr>{}</tr>", cell.repeat(size.cols));
    format!("<table {TABLE_ATTRS}>{}</table>", row.repeat(size.rows))
}

/// Link opening in a new target. Both fields are required.
pub fn link_markup(url: &str, text: &str) -> Option<String> {
    if url.is_empty() || text.is_empty() {
        return None;
    }
    Some(format!(
        r#"<a href="{}" target="_blank">{}</a>"#,
        escape_attr(url),
        escape_text(text)
    ))
}

/// Inline image. `alt` falls back to a generic label.
pub fn image_markup(url: &str, alt: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }
    let alt = if alt.is_empty() { DEFAULT_IMAGE_ALT } else { alt };
    Some(format!(
        r#"<img src="{}" alt="{}" style="{IMAGE_STYLE}">"#,
        escape_attr(url),
        escape_attr(alt)
    ))
}

/// Inline image from a locally read file, given as a data URL.
pub fn local_image_markup(data_url: &str) -> Option<String> {
    if !data_url.starts_with("data:") {
        return None;
    }
    image_markup(data_url, LOCAL_IMAGE_ALT)
}

fn leading_positive_int(raw: &str) -> Option<usize> {
    let trimmed = raw.trim_start();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = digits
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<usize>().ok().filter(|value| *value > 0)
}

#[cfg(test)]
mod tests {
    use super::{
        apply, image_markup, link_markup, local_image_markup, table_markup, Command, TableSize,
    };
    use crate::editor::adapter::SurfaceAdapter;
    use crate::model::document::{Document, DocumentId};
    use crate::surface::{Boundary, SelectionRange};

    fn adapter(content: &str) -> SurfaceAdapter {
        SurfaceAdapter::mount(&Document::new(DocumentId::new("1").unwrap(), "t", content))
    }

    #[test]
    fn dialog_values_parse_like_leading_integers() {
        assert_eq!(TableSize::from_dialog("3", "3"), TableSize::default());
        assert_eq!(TableSize::from_dialog(" 4 rows", "2"), TableSize { rows: 4, cols: 2 });
        assert_eq!(TableSize::from_dialog("0", "abc"), TableSize::default());
        assert_eq!(TableSize::from_dialog("-2", ""), TableSize::default());
    }

    #[test]
    fn table_markup_has_requested_shape() {
        let markup = table_markup(TableSize { rows: 2, cols: 4 });
        assert_eq!(markup.matches("<tr>").count(), 2);
        assert_eq!(markup.matches("<td ").count(), 8);
        assert!(markup.starts_with("<table border=\"1\""));
        assert!(markup.contains("class=\"editable-table\""));
    }

    #[test]
    fn link_and_image_builders_validate_inputs() {
        assert_eq!(link_markup("", "x"), None);
        assert_eq!(link_markup("u", ""), None);
        assert_eq!(
            link_markup("https://a.b/?q=1&r=\"2\"", "a<b").as_deref(),
            Some(r#"<a href="https://a.b/?q=1&amp;r=&quot;2&quot;" target="_blank">a&lt;b</a>"#)
        );
        assert!(image_markup("x.png", "").unwrap().contains("alt=\"Image\""));
        assert_eq!(image_markup("", "alt"), None);
        assert_eq!(local_image_markup("http://x/y.png"), None);
        assert!(local_image_markup("data:image/png;base64,AAAA")
            .unwrap()
            .contains("alt=\"Uploaded image\""));
    }

    #[test]
    fn command_on_blurred_surface_refocuses_and_keeps_caret() {
        let mut adapter = adapter("<p>ab</p>");
        let at = adapter.surface().find_text("b").unwrap();
        adapter
            .surface_mut()
            .set_selection(SelectionRange::caret(at))
            .unwrap();
        adapter.surface_mut().blur();

        let changed = apply(&mut adapter, &Command::InsertMarkup("<br>".to_string()));
        assert!(changed);
        assert!(adapter.surface().is_focused());
        assert_eq!(adapter.pending().content, "<p>a<br>b</p>");
    }

    #[test]
    fn bold_then_undo_resyncs_pending_each_time() {
        let mut adapter = adapter("<p>word</p>");
        let at = adapter.surface().find_text("word").unwrap();
        adapter
            .surface_mut()
            .set_selection(SelectionRange::new(at, Boundary::new(at.container, 4)))
            .unwrap();

        assert!(apply(&mut adapter, &Command::Bold));
        assert_eq!(adapter.pending().content, "<p><b>word</b></p>");
        assert!(apply(&mut adapter, &Command::Undo));
        assert_eq!(adapter.pending().content, "<p>word</p>");
        assert!(apply(&mut adapter, &Command::Redo));
        assert_eq!(adapter.pending().content, "<p><b>word</b></p>");
    }
}
