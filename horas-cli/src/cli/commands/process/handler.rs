//! Process command handler

use anyhow::{Context, Result};
use colored::*;
use is_terminal::IsTerminal;
use std::process::ExitCode;
use unicode_width::UnicodeWidthStr;

use super::{OutputFormat, ProcessCommands};
use crate::attendance::types::columns;
use crate::attendance::{AggregatedRow, Pipeline, ProcessOutcome};
use crate::config::Config;

/// Run the pipeline over the given files and print the outcome
///
/// A failed run is reported to the user and mapped to exit status 1; only
/// problems printing the outcome surface as `Err`.
pub fn handle_process_command(args: ProcessCommands, config: &Config) -> Result<ExitCode> {
    if args.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let storage = config.storage();
    let pipeline = Pipeline::new(&storage, config.export_options());

    let result = pipeline.run(&args.files);
    if let Err(e) = &result {
        log::debug!("Processing failed: {:?}", e);
    }
    let outcome = ProcessOutcome::from(result);

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&outcome).context("Failed to format JSON output")?;
            println!("{}", json);
        }
        OutputFormat::JsonCompact => {
            let json = serde_json::to_string(&outcome).context("Failed to format JSON output")?;
            println!("{}", json);
        }
        OutputFormat::Csv => match &outcome.rows {
            Some(rows) => print!("{}", rows_to_csv(rows)?),
            None => print_failure(&outcome),
        },
        OutputFormat::Table => {
            if outcome.success {
                println!("{}", format_table(&outcome));
            } else {
                print_failure(&outcome);
            }
        }
    }

    Ok(if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn print_failure(outcome: &ProcessOutcome) {
    eprintln!(
        "{} {}",
        "Error:".red().bold(),
        outcome.error.as_deref().unwrap_or("unknown error")
    );
}

/// Serialize result rows as CSV with the sheet column names as header
fn rows_to_csv(rows: &[AggregatedRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if rows.is_empty() {
        writer.write_record(columns::REQUIRED)?;
    }
    for row in rows {
        writer.serialize(row).context("Failed to write CSV row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

fn pad(text: &str, width: usize, right: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(text.width()));
    if right {
        format!("{}{}", fill, text)
    } else {
        format!("{}{}", text, fill)
    }
}

/// Render rows and totals for the terminal
fn format_table(outcome: &ProcessOutcome) -> String {
    let rows = outcome.rows.as_deref().unwrap_or(&[]);

    let cells: Vec<[String; 5]> = rows
        .iter()
        .map(|r| {
            let [cpf, dre, school, participant] = r.key_fields();
            [
                cpf.to_string(),
                dre.to_string(),
                school.to_string(),
                participant.to_string(),
                format!("{:.2}", r.hours),
            ]
        })
        .collect();

    let mut widths: [usize; 5] = columns::REQUIRED.map(|h| h.width());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = columns::REQUIRED
        .iter()
        .zip(widths)
        .map(|(h, w)| pad(h, w, false).bold().to_string())
        .collect();
    out.push_str(&header.join("  "));
    out.push('\n');

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .enumerate()
            // Hours column is right-aligned
            .map(|(col, (cell, w))| pad(cell, w, col == 4))
            .collect();
        out.push_str(&line.join("  "));
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&format!(
        "{} {}\n",
        "Distinct CPFs:".cyan(),
        outcome.total_cpfs.unwrap_or(0)
    ));
    out.push_str(&format!(
        "{} {:.2}\n",
        "Total CH cursada:".cyan(),
        outcome.total_hours.unwrap_or(0.0)
    ));
    out.push_str(&format!(
        "{} {} file(s), {} sheet(s)\n",
        "Processed:".cyan(),
        outcome.files_processed.unwrap_or(0),
        outcome.sheets_processed.unwrap_or(0)
    ));
    if let Some(path) = &outcome.output_path {
        out.push_str(&format!("{} {}", "Result workbook:".cyan(), path.display()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::types::{AggregationReport, GroupKey};
    use std::path::PathBuf;

    fn outcome() -> ProcessOutcome {
        colored::control::set_override(false);
        ProcessOutcome::success(AggregationReport {
            rows: vec![
                AggregatedRow::from_group(GroupKey::new("111", "123", "Escola A", "Ana"), 3.0),
                AggregatedRow::from_group(GroupKey::new("222", "123", "Escola São João", "Bia"), 1.25),
            ],
            total_cpfs: 2,
            total_hours: 4.25,
            files_processed: 1,
            sheets_processed: 2,
            output_path: PathBuf::from("media/horas_por_cpf.xlsx"),
        })
    }

    #[test]
    fn test_format_table() {
        let table = format_table(&outcome());
        let lines: Vec<&str> = table.lines().collect();

        assert!(lines[0].starts_with("CPF"));
        assert!(lines[0].contains("CH cursada"));
        assert!(lines[1].ends_with("      3.00"));
        assert!(lines[2].contains("Escola São João"));
        assert!(table.contains("Distinct CPFs: 2"));
        assert!(table.contains("Total CH cursada: 4.25"));
        assert!(table.contains("Processed: 1 file(s), 2 sheet(s)"));
        assert!(table.contains("Result workbook: media/horas_por_cpf.xlsx"));
    }

    #[test]
    fn test_rows_to_csv() {
        let csv = rows_to_csv(outcome().rows.as_deref().unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("CPF,DRE,Nome da escola,Cursista,CH cursada"));
        assert_eq!(lines.next(), Some("111,123,Escola A,Ana,3.0"));
        assert_eq!(lines.next(), Some("222,123,Escola São João,Bia,1.25"));
    }

    #[test]
    fn test_rows_to_csv_empty_has_header() {
        let csv = rows_to_csv(&[]).unwrap();
        assert_eq!(csv, "CPF,DRE,Nome da escola,Cursista,CH cursada\n");
    }

    #[test]
    fn test_pad_uses_display_width() {
        assert_eq!(pad("ão", 4, false), "ão  ");
        assert_eq!(pad("1.00", 6, true), "  1.00");
        assert_eq!(pad("longer", 3, false), "longer");
    }
}
