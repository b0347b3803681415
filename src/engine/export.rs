//! Roster export
//!
//! Projects views into flat rows with a fixed column order and encodes them as
//! delimited text (with a UTF-8 byte-order mark) or pretty-printed JSON.

use chrono::NaiveDate;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::selection::Selection;
use crate::models::{AttendeeId, AttendeeView};
use crate::utils::errors::{ConsoleError, Result};
use crate::utils::helpers::{format_optional_timestamp, format_timestamp, sanitize_filename};
use crate::utils::logging::log_export;

/// Byte-order mark prefixed to delimited output so spreadsheet tools pick UTF-8
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Column headers, in output order
pub const EXPORT_COLUMNS: [&str; 12] = [
    "ID",
    "Name",
    "Email",
    "Phone",
    "Company",
    "Position",
    "Gender",
    "Status",
    "Conferences",
    "Last check-in",
    "Last check-out",
    "Created at",
];

const CONFERENCE_SEPARATOR: &str = "; ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(ConsoleError::InvalidInput(format!(
                "Unsupported export format: {}",
                other
            ))),
        }
    }
}

/// One exported line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub id: AttendeeId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub position: String,
    pub gender: String,
    pub status: String,
    pub conferences: String,
    pub last_checkin: String,
    pub last_checkout: String,
    pub created_at: String,
}

impl ExportRow {
    pub fn from_view(view: &AttendeeView) -> Self {
        let attendee = &view.attendee;
        Self {
            id: attendee.id,
            name: attendee.name.clone(),
            email: attendee.email.clone(),
            phone: attendee.phone.clone().unwrap_or_default(),
            company: attendee.company.clone().unwrap_or_default(),
            position: attendee.position.clone().unwrap_or_default(),
            gender: attendee.gender.clone().unwrap_or_default(),
            status: view.overall_status.label().to_string(),
            conferences: view.conference_names().join(CONFERENCE_SEPARATOR),
            last_checkin: format_optional_timestamp(view.last_checkin_time),
            last_checkout: format_optional_timestamp(view.last_checkout_time),
            created_at: format_timestamp(attendee.created_at),
        }
    }

    /// Field values in `EXPORT_COLUMNS` order
    pub fn fields(&self) -> [Cow<'_, str>; 12] {
        [
            Cow::Owned(self.id.to_string()),
            Cow::Borrowed(&self.name),
            Cow::Borrowed(&self.email),
            Cow::Borrowed(&self.phone),
            Cow::Borrowed(&self.company),
            Cow::Borrowed(&self.position),
            Cow::Borrowed(&self.gender),
            Cow::Borrowed(&self.status),
            Cow::Borrowed(&self.conferences),
            Cow::Borrowed(&self.last_checkin),
            Cow::Borrowed(&self.last_checkout),
            Cow::Borrowed(&self.created_at),
        ]
    }
}

/// An encoded export ready to be saved or streamed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub rows: usize,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    /// Write the file into `dir`, returning the full path
    pub async fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.filename);
        tokio::fs::write(&path, &self.bytes).await?;
        Ok(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Exported(ExportFile),
    /// No selected or visible rows; nothing was produced
    NothingToExport,
}

/// `<prefix>_<YYYY-MM-DD>.<ext>`
pub fn export_filename(prefix: &str, date: NaiveDate, format: ExportFormat) -> String {
    format!(
        "{}_{}.{}",
        sanitize_filename(prefix),
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Quote a field containing the delimiter, a quote or a line break
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn encode_csv(rows: &[ExportRow]) -> Vec<u8> {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(EXPORT_COLUMNS.join(","));
    for row in rows {
        let fields: Vec<String> = row
            .fields()
            .iter()
            .map(|field| escape_field(field).into_owned())
            .collect();
        lines.push(fields.join(","));
    }

    let mut bytes = UTF8_BOM.to_vec();
    bytes.extend_from_slice(lines.join("\n").as_bytes());
    bytes
}

/// Rows to export: the selected views if anything is selected, otherwise all
/// given views. Input order is kept.
pub fn export_rows(views: &[AttendeeView], selection: &Selection) -> Vec<ExportRow> {
    views
        .iter()
        .filter(|view| selection.is_empty() || selection.contains(view.id()))
        .map(ExportRow::from_view)
        .collect()
}

/// Encode the selected (or, with an empty selection, all) views.
///
/// `views` is expected to be the currently filtered and sorted roster.
pub fn export(
    views: &[AttendeeView],
    selection: &Selection,
    format: ExportFormat,
    date: NaiveDate,
    prefix: &str,
) -> Result<ExportOutcome> {
    let rows = export_rows(views, selection);
    if rows.is_empty() {
        return Ok(ExportOutcome::NothingToExport);
    }

    let bytes = match format {
        ExportFormat::Csv => encode_csv(&rows),
        ExportFormat::Json => serde_json::to_vec_pretty(&rows)?,
    };

    let file = ExportFile {
        filename: export_filename(prefix, date, format),
        content_type: format.content_type(),
        rows: rows.len(),
        bytes,
    };
    log_export(&file.filename, file.rows, file.bytes.len());
    Ok(ExportOutcome::Exported(file))
}
