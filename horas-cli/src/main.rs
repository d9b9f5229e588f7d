//! horas - sum attended course hours per person across attendance workbooks
//!
//! Exit codes:
//!   0 - Success
//!   1 - Processing failed (missing column, malformed duration, file error)
//!   2 - `download` found no result workbook

mod attendance;
mod cli;
mod config;

use clap::Parser;
use colored::*;
use std::process::ExitCode;

use cli::{Cli, Commands};
use config::Config;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_filter())
        .parse_default_env()
        .init();

    log::debug!("horas v{}", env!("CARGO_PKG_VERSION"));

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            log::debug!("{:?}", e);
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = Config::load(cli.config.as_deref(), cli.storage_dir.as_deref())?;
    log::info!("Using storage directory {}", config.storage_dir.display());

    match cli.command {
        Commands::Process(args) => cli::commands::process::handle_process_command(args, &config),
        Commands::Download(args) => cli::commands::download::handle_download_command(args, &config),
    }
}
