//! Download command handler

use anyhow::{Context, Result};
use colored::*;
use std::process::ExitCode;

use super::DownloadCommands;
use crate::attendance::DownloadOutcome;
use crate::config::Config;

/// Exit status when no result workbook exists yet
pub const NOT_FOUND_EXIT: u8 = 2;

/// Copy the latest result workbook to the requested destination
pub fn handle_download_command(args: DownloadCommands, config: &Config) -> Result<ExitCode> {
    let storage = config.storage();

    let outcome = storage
        .download(&args.dest)
        .with_context(|| format!("Failed to copy result to {}", args.dest.display()))?;

    match outcome {
        DownloadOutcome::Delivered { path, bytes } => {
            println!(
                "{} {} ({} bytes)",
                "Saved".green().bold(),
                path.display(),
                bytes
            );
            Ok(ExitCode::SUCCESS)
        }
        DownloadOutcome::NotFound { expected } => {
            eprintln!(
                "{} no result workbook at {}, run `horas process` first",
                "Not found:".yellow().bold(),
                expected.display()
            );
            Ok(ExitCode::from(NOT_FOUND_EXIT))
        }
    }
}
