//! Command line interface

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{DownloadCommands, ProcessCommands};

#[derive(Parser, Debug)]
#[command(name = "horas", version, about = "Sum attended course hours (CH cursada) per person across attendance spreadsheets")]
pub struct Cli {
    /// Config file (defaults to $HORAS_CONFIG, then <config dir>/horas/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding staged inputs and the result workbook
    #[arg(long, global = true)]
    pub storage_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Aggregate hours from one or more attendance workbooks
    Process(ProcessCommands),
    /// Copy the latest result workbook
    Download(DownloadCommands),
}

impl Cli {
    pub fn log_filter(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}
