pub mod download;
pub mod process;

pub use download::DownloadCommands;
pub use process::ProcessCommands;
