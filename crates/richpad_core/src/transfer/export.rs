//! Downloadable export files.

use crate::model::document::{Document, DocumentId};
use crate::store::DocumentStore;
use crate::surface::markup::markup_to_text;
use crate::transfer::TransferError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const HTML_MEDIA_TYPE: &str = "text/html";
pub const TEXT_MEDIA_TYPE: &str = "text/plain;charset=utf-8";
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// A file ready to be handed to the host for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub media_type: &'static str,
    pub contents: String,
}

/// JSON backup envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub notes: Vec<Document>,
    pub current_note_id: DocumentId,
    /// ISO-8601 UTC timestamp with millisecond precision.
    pub export_date: String,
}

/// Raw markup saved as `<title>.html`.
pub fn export_html(document: &Document) -> ExportFile {
    ExportFile {
        file_name: format!("{}.html", document.title),
        media_type: HTML_MEDIA_TYPE,
        contents: document.content.clone(),
    }
}

/// Markup-free text saved as `<title>.txt`.
pub fn export_text(document: &Document) -> ExportFile {
    ExportFile {
        file_name: format!("{}.txt", document.title),
        media_type: TEXT_MEDIA_TYPE,
        contents: markup_to_text(&document.content),
    }
}

/// Pretty-printed backup of the whole collection.
pub fn export_backup(
    store: &DocumentStore,
    exported_at: DateTime<Utc>,
) -> Result<ExportFile, TransferError> {
    let backup = Backup {
        notes: store.documents().to_vec(),
        current_note_id: store.active_id().clone(),
        export_date: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    Ok(ExportFile {
        file_name: format!("text-editor-backup-{}.json", exported_at.format("%Y-%m-%d")),
        media_type: JSON_MEDIA_TYPE,
        contents: serde_json::to_string_pretty(&backup)?,
    })
}

#[cfg(test)]
mod tests {
    use super::{export_backup, export_html, export_text, Backup};
    use crate::model::document::{Document, DocumentId};
    use crate::store::DocumentStore;
    use chrono::{TimeZone, Utc};

    fn sample() -> Document {
        Document::new(
            DocumentId::new("1").unwrap(),
            "Report",
            "<p>Hello <b>world</b>&nbsp;!</p>",
        )
    }

    #[test]
    fn html_export_keeps_raw_markup() {
        let file = export_html(&sample());
        assert_eq!(file.file_name, "Report.html");
        assert_eq!(file.media_type, "text/html");
        assert_eq!(file.contents, "<p>Hello <b>world</b>&nbsp;!</p>");
    }

    #[test]
    fn text_export_strips_markup() {
        let file = export_text(&sample());
        assert_eq!(file.file_name, "Report.txt");
        assert_eq!(file.contents, "Hello world\u{a0}!");
    }

    #[test]
    fn backup_uses_camel_case_envelope_and_dated_name() {
        let store = DocumentStore::with_default("New document");
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap();
        let file = export_backup(&store, at).unwrap();

        assert_eq!(file.file_name, "text-editor-backup-2026-10-18.json");
        assert!(file.contents.contains("\n  \"notes\""));
        let backup: Backup = serde_json::from_str(&file.contents).unwrap();
        assert_eq!(backup.current_note_id.as_str(), "1");
        assert_eq!(backup.export_date, "2026-10-18T09:30:00.000Z");
        assert_eq!(backup.notes, store.documents());
    }
}
