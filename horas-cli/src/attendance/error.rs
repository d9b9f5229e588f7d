//! Errors raised by the aggregation pipeline

use std::path::{Path, PathBuf};

/// Any failure that aborts a processing run
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// A sheet lacks one of the required columns
    MissingColumn {
        file: String,
        sheet: String,
        column: String,
    },
    /// An hours cell could not be read as an `H:MM` duration
    MalformedDuration {
        file: String,
        sheet: String,
        /// 1-based spreadsheet row, header included
        row: usize,
        value: String,
    },
    /// A file could not be read, parsed, written or moved
    Io { path: PathBuf, message: String },
}

impl PipelineError {
    pub fn io(path: &Path, err: impl std::fmt::Display) -> Self {
        PipelineError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::MissingColumn {
                file,
                sheet,
                column,
            } => write!(
                f,
                "Sheet '{}' in '{}' is missing required column '{}'",
                sheet, file, column
            ),
            PipelineError::MalformedDuration {
                file,
                sheet,
                row,
                value,
            } => write!(
                f,
                "Invalid CH cursada value '{}' at row {} of sheet '{}' in '{}' (expected H:MM)",
                value, row, sheet, file
            ),
            PipelineError::Io { path, message } => {
                write!(f, "File error on {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for PipelineError {}
