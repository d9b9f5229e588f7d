//! Attendance hours aggregation
//!
//! Reads attendance workbooks, normalizes their sheets, sums `CH cursada`
//! per (CPF, DRE, Nome da escola, Cursista) and writes one result workbook.

pub mod aggregate;
pub mod error;
pub mod excel;
pub mod normalize;
pub mod outcome;
pub mod pipeline;
pub mod storage;
pub mod types;

pub use excel::ExportOptions;
pub use outcome::ProcessOutcome;
pub use pipeline::Pipeline;
pub use storage::{DownloadOutcome, Storage};
pub use types::AggregatedRow;
