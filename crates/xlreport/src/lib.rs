//! `xlreport` v1:
//! Configured xlsx report builder.
//!
//! Modules:
//! - `config` : YAML loading and load-time validation
//! - `error`  : crate error type
//! - `read`   : delimited source tables through polars
//! - `report` : `ExcelReport`, one workbook per run
pub mod config;
pub mod error;
pub mod read;
pub mod report;

pub use config::{derive_delimiter_byte, load_config, parse_config, validate_config};
pub use error::ReportError;
pub use read::read_delimited_table;
pub use report::ExcelReport;
pub use xlreport_io_fs::{ReportWrite, SpecWriteError};
pub use xlreport_io_xlsx::{SpecReportConfig, SpecSheetConfig, SpecXlsxReport};
