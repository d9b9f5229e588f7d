//! Read every sheet of an attendance workbook
//!
//! The first row of a sheet is its header; every following row is data.
//! Sheets are returned in workbook order.

use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;

use crate::attendance::error::PipelineError;

/// A sheet as read from disk, before any normalization
#[derive(Debug, Clone)]
pub struct RawSheet {
    pub name: String,
    /// Zero-based sheet row holding the header
    pub header_row: u32,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Data>>,
}

impl RawSheet {
    /// Index of the first column whose header equals `name`
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Load all sheets of the workbook at `path`
pub fn read_workbook(path: &Path) -> Result<Vec<RawSheet>, PipelineError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| PipelineError::io(path, e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for sheet_name in sheet_names {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| PipelineError::io(path, format!("sheet '{}': {}", sheet_name, e)))?;

        // The range starts at the first used cell, not at A1
        let header_row = range.start().map(|(row, _)| row).unwrap_or(0);
        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header) => header.iter().map(header_text).collect(),
            None => Vec::new(),
        };
        let rows: Vec<Vec<Data>> = rows.map(|r| r.to_vec()).collect();

        log::debug!(
            "Read sheet '{}' from {} ({} columns, {} data rows)",
            sheet_name,
            path.display(),
            headers.len(),
            rows.len()
        );

        sheets.push(RawSheet {
            name: sheet_name,
            header_row,
            headers,
            rows,
        });
    }

    Ok(sheets)
}

fn header_text(cell: &Data) -> String {
    cell_text(cell).unwrap_or_default()
}

/// Text form of a key cell, `None` when the cell is blank
///
/// Whole numbers lose their fractional part so that `111.0` and `111`
/// group together.
pub fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                Some((*f as i64).to_string())
            } else {
                Some(f.to_string())
            }
        }
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(format!("{}", dt)),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}
