// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delimited-text row codec for the record store file.
//!
//! One record per line: `logical_id,external_file_ref,display_name,media_kind`.
//! A field containing `,` or `"` is wrapped in quotes with embedded quotes
//! doubled. Parsing is best-effort: short rows get empty fields and an
//! unterminated quote consumes the rest of the line.

use arkive_core::{ArchiveRecord, ArkiveError, MediaKind};
use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, Trim, WriterBuilder};

/// Header line written when the store file is created.
pub const HEADER: &str = "id,file_id,file_name,type";

/// Case-insensitive token identifying a header line.
const HEADER_MARKER: &str = "file_id";

/// Whether `line` is a header row.
pub fn is_header(line: &str) -> bool {
    line.to_ascii_lowercase().contains(HEADER_MARKER)
}

/// Replaces line breaks so a record always occupies exactly one line.
pub fn sanitize_field(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// Encodes one record as a line without its terminator.
pub fn encode_row(record: &ArchiveRecord) -> Result<String, ArkiveError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer
        .write_record([
            sanitize_field(&record.logical_id),
            sanitize_field(&record.external_file_ref),
            sanitize_field(&record.display_name),
            record.media_kind.to_string(),
        ])
        .map_err(|e| ArkiveError::Serialization {
            source: Box::new(e),
        })?;

    let bytes = writer
        .into_inner()
        .map_err(|e| ArkiveError::Internal(format!("failed to flush record row: {e}")))?;
    let line = String::from_utf8(bytes).map_err(|e| ArkiveError::Serialization {
        source: Box::new(e),
    })?;
    Ok(line.trim_end_matches('\n').to_string())
}

/// Splits one line into trimmed, unquoted fields. Never fails.
pub fn parse_fields(line: &str) -> Vec<String> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(line.as_bytes());

    let mut record = StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) => record.iter().map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

/// Parses one data line into a record. `None` for a line with no fields.
pub fn parse_row(line: &str) -> Option<ArchiveRecord> {
    let mut fields = parse_fields(line).into_iter();
    let logical_id = fields.next()?;
    let external_file_ref = fields.next().unwrap_or_default();
    let display_name = fields.next().unwrap_or_default();
    let media_kind = MediaKind::from_stored(&fields.next().unwrap_or_default());
    Some(ArchiveRecord {
        logical_id,
        external_file_ref,
        display_name,
        media_kind,
    })
}
