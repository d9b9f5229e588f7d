//! `horas download`

mod handler;

pub use handler::handle_download_command;

use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct DownloadCommands {
    /// Destination file or directory
    #[arg(short, long, default_value = ".")]
    pub dest: PathBuf,
}
