//! `xlreport_io_fs` v1:
//! Filesystem collaborators of the report engine.
//!
//! Modules:
//! - `locate` : latest-matching input file discovery
//! - `output` : multi-destination workbook write
//! - `spec`   : errors and per-entry failure models
//! - `report` : run-time write report model
//! - `util`   : shared helper functions

pub mod locate;
pub mod output;
pub mod report;
pub mod spec;
mod util;

pub use locate::find_latest_matching_file;
pub use output::write_to_destinations;
pub use report::{ReportWrite, ReportWriteBuilder};
pub use spec::{LocateFileError, SpecWriteError};
