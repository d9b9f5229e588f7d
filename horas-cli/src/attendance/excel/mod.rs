//! Excel import of attendance sheets and export of the aggregated result

pub mod reader;
pub mod writer;

pub use reader::{RawSheet, read_workbook};
pub use writer::{ExportOptions, write_result_excel};
