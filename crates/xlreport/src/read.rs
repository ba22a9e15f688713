//! Delimited source table reader.

use std::path::Path;

use polars::prelude::*;
use xlreport_io_xlsx::{SpecTable, derive_table_from_dataframe};

use crate::error::ReportError;

/// Read a delimited text file with a header row into a [`SpecTable`].
///
/// Column types are inferred; empty fields become missing cells.
pub fn read_delimited_table<P>(path: P, delimiter: u8) -> Result<SpecTable, ReportError>
where
    P: AsRef<Path>,
{
    let path_file = path.as_ref();
    let map_err_read = |source: PolarsError| ReportError::TableRead {
        path: path_file.to_path_buf(),
        source,
    };

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_separator(delimiter))
        .try_into_reader_with_file_path(Some(path_file.to_path_buf()))
        .map_err(map_err_read)?
        .finish()
        .map_err(map_err_read)?;

    tracing::debug!(
        file = %path_file.display(),
        rows = df.height(),
        cols = df.width(),
        "source table read"
    );
    Ok(derive_table_from_dataframe(&df)?)
}
