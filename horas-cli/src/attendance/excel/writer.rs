//! Write the aggregated result workbook

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use std::path::Path;
use unicode_width::UnicodeWidthStr;

use crate::attendance::error::PipelineError;
use crate::attendance::types::{AggregatedRow, columns};

/// Presentation settings for the result workbook
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub sheet_name: String,
    pub max_column_width: f64,
    pub column_padding: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            sheet_name: "Resultado".to_string(),
            max_column_width: 40.0,
            column_padding: 2.0,
        }
    }
}

/// Column indices of the result sheet
mod cols {
    pub const HOURS: u16 = 4;
    pub const LAST: u16 = HOURS;
}

fn hours_text(hours: f64) -> String {
    format!("{:.2}", hours)
}

/// Displayed text of every cell in column `col`
fn column_texts(rows: &[AggregatedRow], col: u16) -> Vec<String> {
    rows.iter()
        .map(|row| match col {
            cols::HOURS => hours_text(row.hours),
            key_col => row.key_fields()[key_col as usize].to_string(),
        })
        .collect()
}

/// Width of a column: longest of header and cells, plus padding, capped
pub fn column_width(header: &str, cells: &[String], options: &ExportOptions) -> f64 {
    let longest = cells
        .iter()
        .map(|c| c.width())
        .chain(std::iter::once(header.width()))
        .max()
        .unwrap_or(0);
    (longest as f64 + options.column_padding).min(options.max_column_width)
}

/// Whether every non-blank value of a key column reads as a number
pub fn is_numeric_column(cells: &[String]) -> bool {
    let mut values = cells.iter().filter(|c| !c.is_empty()).peekable();
    values.peek().is_some() && values.all(|c| c.trim().parse::<f64>().is_ok())
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xD9D9D9))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::Black)
        .set_align(FormatAlign::Center)
}

fn write_sheet(
    sheet: &mut Worksheet,
    rows: &[AggregatedRow],
    options: &ExportOptions,
) -> Result<(), XlsxError> {
    sheet.set_name(&options.sheet_name)?;

    let header_format = header_format();
    let hours_format = Format::new()
        .set_num_format("0.00")
        .set_align(FormatAlign::Right);
    let right_format = Format::new().set_align(FormatAlign::Right);
    let left_format = Format::new().set_align(FormatAlign::Left);

    for (col, header) in columns::REQUIRED.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *header, &header_format)?;

        let texts = column_texts(rows, col);
        sheet.set_column_width(col, column_width(header, &texts, options))?;

        if col == cols::HOURS {
            for (idx, row) in rows.iter().enumerate() {
                sheet.write_number_with_format(idx as u32 + 1, col, row.hours, &hours_format)?;
            }
            continue;
        }

        let format = if is_numeric_column(&texts) {
            &right_format
        } else {
            &left_format
        };
        for (idx, text) in texts.iter().enumerate() {
            if text.is_empty() {
                continue;
            }
            sheet.write_string_with_format(idx as u32 + 1, col, text, format)?;
        }
    }

    sheet.set_freeze_panes(1, 0)?;
    sheet.autofilter(0, 0, rows.len() as u32, cols::LAST)?;
    Ok(())
}

/// Write `rows` to `path`, replacing any previous file
///
/// The workbook is saved next to `path` first and renamed into place, so a
/// failed save never leaves a partial file at `path`.
pub fn write_result_excel(
    rows: &[AggregatedRow],
    path: &Path,
    options: &ExportOptions,
) -> Result<(), PipelineError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    write_sheet(sheet, rows, options).map_err(|e| PipelineError::io(path, e))?;

    let partial = path.with_extension("xlsx.partial");
    if let Err(e) = workbook.save(&partial) {
        let _ = std::fs::remove_file(&partial);
        return Err(PipelineError::io(path, e));
    }
    if let Err(e) = std::fs::rename(&partial, path) {
        let _ = std::fs::remove_file(&partial);
        return Err(PipelineError::io(path, e));
    }

    log::info!("Result workbook written to {} ({} rows)", path.display(), rows.len());
    Ok(())
}
