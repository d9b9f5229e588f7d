//! Sheet normalization
//!
//! Turns a [`RawSheet`] into [`Record`]s:
//! 1. header variants with trailing whitespace are mapped to canonical names
//! 2. the hours column is coerced to fractional hours
//! 3. DRE and school are filled forward over merged-cell gaps

use calamine::Data;
use once_cell::sync::Lazy;
use regex::Regex;

use super::error::PipelineError;
use super::excel::RawSheet;
use super::excel::reader::cell_text;
use super::types::{GroupKey, Record, columns};

static CLOCK_DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):([0-5]?\d)$").expect("valid duration regex"));

/// How the hours column stores its values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoursFormat {
    /// Plain numbers, taken as hours
    Numeric,
    /// `H:MM` clock strings
    Clock,
}

/// Map trailing-whitespace header variants onto their canonical names
///
/// When a sheet has both `DRE` and `DRE `, only the leftmost is kept under
/// the canonical name.
pub fn canonicalize_headers(headers: &mut [String], sheet_name: &str) {
    for canonical in columns::CANONICAL_VARIANTS {
        let mut seen = false;
        for header in headers.iter_mut() {
            if header.trim_end() != canonical {
                continue;
            }
            if seen {
                log::warn!(
                    "Sheet '{}' has more than one '{}' column, using the leftmost",
                    sheet_name,
                    canonical
                );
                break;
            }
            seen = true;
            if *header != canonical {
                *header = canonical.to_string();
            }
        }
    }
}

/// Parse an `H:MM` clock string into fractional hours
pub fn parse_clock_duration(text: &str) -> Option<f64> {
    let caps = CLOCK_DURATION.captures(text.trim())?;
    let hours: u64 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: u64 = caps.get(2)?.as_str().parse().ok()?;
    let seconds = hours * 3600 + minutes * 60;
    Some(seconds as f64 / 3600.0)
}

/// Detect the storage format of the hours column
///
/// A single text cell makes the whole column a clock column.
pub fn detect_hours_format(rows: &[Vec<Data>], col: usize) -> HoursFormat {
    let textual = rows.iter().any(|row| {
        matches!(
            row.get(col),
            Some(Data::String(_) | Data::DateTimeIso(_) | Data::DurationIso(_))
        )
    });
    if textual {
        HoursFormat::Clock
    } else {
        HoursFormat::Numeric
    }
}

/// Hours held by one cell under the column's format
///
/// `Ok(None)` means the cell is blank. `Err(text)` carries the offending
/// value for error reporting.
fn coerce_hours(cell: &Data, format: HoursFormat) -> Result<Option<f64>, String> {
    match (cell, format) {
        (Data::Empty | Data::Error(_), _) => Ok(None),
        (Data::String(s), _) if s.trim().is_empty() => Ok(None),
        // Time-formatted cells hold a fraction of a day
        (Data::DateTime(dt), _) => Ok(Some(dt.as_f64() * 24.0)),
        (Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s), HoursFormat::Clock) => {
            parse_clock_duration(s).map(Some).ok_or_else(|| s.clone())
        }
        (Data::Float(f), HoursFormat::Numeric) => Ok(Some(*f)),
        (Data::Int(i), HoursFormat::Numeric) => Ok(Some(*i as f64)),
        (other, _) => Err(cell_text(other).unwrap_or_default()),
    }
}

/// Normalize one sheet of `file` into records
pub fn normalize_sheet(file: &str, mut sheet: RawSheet) -> Result<Vec<Record>, PipelineError> {
    canonicalize_headers(&mut sheet.headers, &sheet.name);

    let mut indices = [0usize; 5];
    for (slot, column) in indices.iter_mut().zip(columns::REQUIRED) {
        *slot = sheet
            .column(column)
            .ok_or_else(|| PipelineError::MissingColumn {
                file: file.to_string(),
                sheet: sheet.name.clone(),
                column: column.to_string(),
            })?;
    }
    let [cpf_col, dre_col, school_col, participant_col, hours_col] = indices;

    let format = detect_hours_format(&sheet.rows, hours_col);
    log::debug!(
        "Sheet '{}' in '{}': hours column is {:?}",
        sheet.name,
        file,
        format
    );

    let text_at = |row: &[Data], col: usize| row.get(col).and_then(cell_text);

    let mut last_dre: Option<String> = None;
    let mut last_school: Option<String> = None;
    let mut records = Vec::with_capacity(sheet.rows.len());
    let empty = Data::Empty;

    for (idx, row) in sheet.rows.iter().enumerate() {
        let row = row.as_slice();
        let cpf = text_at(row, cpf_col);
        let dre = text_at(row, dre_col);
        let school = text_at(row, school_col);
        let participant = text_at(row, participant_col);
        let hours_cell = row.get(hours_col).unwrap_or(&empty);

        let blank_hours = cell_text(hours_cell).is_none();
        if blank_hours && cpf.is_none() && dre.is_none() && school.is_none() && participant.is_none()
        {
            continue;
        }

        let hours = coerce_hours(hours_cell, format)
            .map_err(|value| PipelineError::MalformedDuration {
                file: file.to_string(),
                sheet: sheet.name.clone(),
                // +1 for the header, +1 for 1-based rows
                row: sheet.header_row as usize + idx + 2,
                value,
            })?
            .unwrap_or(0.0);

        if dre.is_some() {
            last_dre = dre;
        }
        if school.is_some() {
            last_school = school;
        }

        records.push(Record {
            key: GroupKey::new(
                cpf.unwrap_or_default(),
                last_dre.clone().unwrap_or_default(),
                last_school.clone().unwrap_or_default(),
                participant.unwrap_or_default(),
            ),
            hours,
        });
    }

    Ok(records)
}
