//! Result payload handed to the caller after a run

use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;

use super::error::PipelineError;
use super::types::{AggregatedRow, AggregationReport};

/// Either the aggregated rows with their totals, or the error message
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<AggregatedRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cpfs: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_processed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheets_processed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub generated_at: DateTime<Local>,
}

impl ProcessOutcome {
    pub fn success(report: AggregationReport) -> Self {
        Self {
            success: true,
            rows: Some(report.rows),
            total_cpfs: Some(report.total_cpfs),
            total_hours: Some(report.total_hours),
            files_processed: Some(report.files_processed),
            sheets_processed: Some(report.sheets_processed),
            output_path: Some(report.output_path),
            error: None,
            generated_at: Local::now(),
        }
    }

    pub fn failure(error: &PipelineError) -> Self {
        Self {
            success: false,
            rows: None,
            total_cpfs: None,
            total_hours: None,
            files_processed: None,
            sheets_processed: None,
            output_path: None,
            error: Some(error.to_string()),
            generated_at: Local::now(),
        }
    }
}

impl From<Result<AggregationReport, PipelineError>> for ProcessOutcome {
    fn from(result: Result<AggregationReport, PipelineError>) -> Self {
        match result {
            Ok(report) => Self::success(report),
            Err(e) => Self::failure(&e),
        }
    }
}
