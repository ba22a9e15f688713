use std::io;
use std::path::PathBuf;

use thiserror::Error;
use xlreport_io_fs::LocateFileError;
use xlreport_io_xlsx::XlsxLayoutError;

/// Report construction failures.
///
/// Output write failures are not errors; they are collected per
/// destination in [`xlreport_io_fs::ReportWrite`].
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config {origin}: {source}")]
    ConfigParse {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid config: {0}")]
    ConfigInvalid(String),

    #[error("Sheet {sheet:?}: {source}")]
    Locate {
        sheet: String,
        #[source]
        source: LocateFileError,
    },

    #[error("Failed to read table {}: {source}", path.display())]
    TableRead {
        path: PathBuf,
        #[source]
        source: polars::prelude::PolarsError,
    },

    #[error("Sheet {sheet:?}: {source}")]
    Layout {
        sheet: String,
        #[source]
        source: XlsxLayoutError,
    },

    #[error(transparent)]
    Xlsx(#[from] XlsxLayoutError),
}
