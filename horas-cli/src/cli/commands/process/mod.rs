//! `horas process`

mod handler;

pub use handler::handle_process_command;

use clap::{Args, ValueEnum};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ProcessCommands {
    /// Attendance workbooks to aggregate, processed in order
    #[arg(required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// How to print the result
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned table followed by the totals
    Table,
    /// Pretty-printed JSON payload
    Json,
    /// Single-line JSON payload
    JsonCompact,
    /// Result rows as CSV
    Csv,
}
