//! Excel spreadsheet text extraction.
//!
//! Workbooks are parsed with `calamine` from in-memory bytes. Both the legacy
//! binary format (.xls) and Office Open XML (.xlsx) are read natively; no
//! conversion step is needed.
//!
//! Only textual content matters for language detection, so numeric, boolean and
//! date cells are dropped and string cells are joined row by row.
use calamine::{Data, Range, Reader};
use std::io::Cursor;

use crate::error::{LangsiftError, Result};

/// Extract the text of every sheet in `data`.
///
/// `file_extension` is matched without a leading dot and case-insensitively.
pub fn extract_text(data: &[u8], file_extension: &str) -> Result<String> {
    let cursor = Cursor::new(data);

    match file_extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "xlsx" | "xlsm" => {
            let workbook =
                calamine::Xlsx::new(cursor).map_err(|e| LangsiftError::parsing(format!("Failed to parse XLSX: {}", e)))?;
            collect_workbook_text(workbook)
        }
        "xls" => {
            let workbook =
                calamine::Xls::new(cursor).map_err(|e| LangsiftError::parsing(format!("Failed to parse XLS: {}", e)))?;
            collect_workbook_text(workbook)
        }
        other => Err(LangsiftError::UnsupportedFormat(format!(
            "Unsupported spreadsheet extension: {}",
            other
        ))),
    }
}

fn collect_workbook_text<RS, R>(mut workbook: R) -> Result<String>
where
    RS: std::io::Read + std::io::Seek,
    R: Reader<RS>,
{
    let sheet_names = workbook.sheet_names();
    let mut text = String::new();

    for name in &sheet_names {
        match workbook.worksheet_range(name) {
            Ok(range) => append_sheet_text(&mut text, &range),
            Err(e) => tracing::debug!(sheet = %name, error = ?e, "Skipping unreadable sheet"),
        }
    }

    Ok(text)
}

#[inline]
fn append_sheet_text(buffer: &mut String, range: &Range<Data>) {
    for row in range.rows() {
        let mut wrote_cell = false;
        for cell in row {
            if let Data::String(s) = cell {
                let s = s.trim();
                if s.is_empty() {
                    continue;
                }
                if wrote_cell {
                    buffer.push(' ');
                }
                buffer.push_str(s);
                wrote_cell = true;
            }
        }
        if wrote_cell {
            buffer.push('\n');
        }
    }
}
