//! The aggregation pipeline
//!
//! Load → Normalize → Per-sheet Aggregate → Cross-file Merge → Final Aggregate
//! → Sort → Export. Any stage failing aborts the whole run; the result
//! workbook is only written once everything before it succeeded.

use std::path::PathBuf;

use super::aggregate::{PartialTable, aggregate_global, aggregate_sheet, concat_partials, sort_rows, summarize};
use super::error::PipelineError;
use super::excel::{ExportOptions, read_workbook, write_result_excel};
use super::normalize::normalize_sheet;
use super::storage::{StagedFile, Storage};
use super::types::AggregationReport;

pub struct Pipeline<'a> {
    storage: &'a Storage,
    export: ExportOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(storage: &'a Storage, export: ExportOptions) -> Self {
        Self { storage, export }
    }

    /// Process `inputs` in order and write the result workbook
    pub fn run(&self, inputs: &[PathBuf]) -> Result<AggregationReport, PipelineError> {
        log::info!(
            "Processing {} attendance file(s), staging in {}",
            inputs.len(),
            self.storage.root().display()
        );
        self.storage.ensure_root()?;

        let mut partials = Vec::new();
        for input in inputs {
            let staged = self.storage.stage(input)?;
            match self.process_file(&staged) {
                Ok(tables) => partials.extend(tables),
                Err(e) => {
                    log::warn!(
                        "Aborting run on '{}', staged copy left at {}",
                        staged.original_name,
                        staged.path.display()
                    );
                    return Err(e);
                }
            }
            self.storage.discard(&staged)?;
        }
        let sheets_processed = partials.len();

        let stacked = concat_partials(partials);
        log::debug!("Merged partial tables into {} rows", stacked.len());

        let mut rows = aggregate_global(stacked);
        sort_rows(&mut rows);

        let output_path = self.storage.output_path();
        write_result_excel(&rows, &output_path, &self.export)?;

        let (total_cpfs, total_hours) = summarize(&rows);
        log::info!(
            "Aggregated {} rows: {} distinct CPFs, {:.2} hours",
            rows.len(),
            total_cpfs,
            total_hours
        );

        Ok(AggregationReport {
            rows,
            total_cpfs,
            total_hours,
            files_processed: inputs.len(),
            sheets_processed,
            output_path,
        })
    }

    /// Load and sum every sheet of one staged workbook
    fn process_file(&self, staged: &StagedFile) -> Result<Vec<PartialTable>, PipelineError> {
        let sheets = read_workbook(&staged.path)?;
        let mut tables = Vec::with_capacity(sheets.len());

        for sheet in sheets {
            let sheet_name = sheet.name.clone();
            let records = normalize_sheet(&staged.original_name, sheet)?;
            let table = aggregate_sheet(records);
            if table.is_empty() {
                log::warn!(
                    "Sheet '{}' in '{}' has no attendance rows",
                    sheet_name,
                    staged.original_name
                );
            }
            log::debug!(
                "'{}' / '{}': {} group(s), {:.2} hours",
                staged.original_name,
                sheet_name,
                table.len(),
                table.total_hours()
            );
            tables.push(table);
        }

        Ok(tables)
    }
}
