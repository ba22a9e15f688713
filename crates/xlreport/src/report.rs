//! One report run: every configured sheet rendered into a single workbook.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use xlreport_io_fs::{ReportWrite, find_latest_matching_file, write_to_destinations};
use xlreport_io_xlsx::{
    SpecLayoutContext, SpecReportConfig, SpecSheetConfig, SpecTable, SpecXlsxReport, XlsxWriter,
    plan_sheet_layout,
};

use crate::config::{derive_delimiter_byte, read_config, validate_config};
use crate::error::ReportError;
use crate::read::read_delimited_table;

/// A fully built workbook plus the configuration that produced it.
///
/// The generation instant is captured once at construction and shared by
/// every sheet; the workbook is serialized to bytes once and written to
/// each destination by [`Self::serialize`].
#[derive(Debug, Clone)]
pub struct ExcelReport {
    config: SpecReportConfig,
    time_stamp: NaiveDateTime,
    v_xlsx: Vec<u8>,
    l_sheet_reports: Vec<SpecXlsxReport>,
    l_warnings: Vec<String>,
}

impl ExcelReport {
    /// Build the workbook for `config` using the local clock.
    pub fn new(config: SpecReportConfig) -> Result<Self, ReportError> {
        Self::with_time_stamp(config, Local::now().naive_local())
    }

    /// Load the YAML config at `path` and build its workbook.
    ///
    /// The config is validated once, by the build itself.
    pub fn from_file<P>(path: P) -> Result<Self, ReportError>
    where
        P: AsRef<Path>,
    {
        Self::new(read_config(path.as_ref())?)
    }

    /// Build the workbook with an explicit generation instant.
    pub fn with_time_stamp(
        config: SpecReportConfig,
        time_stamp: NaiveDateTime,
    ) -> Result<Self, ReportError> {
        let mut l_warnings = validate_config(&config)?;
        for c_warning in &l_warnings {
            tracing::warn!("{c_warning}");
        }
        let ctx = SpecLayoutContext::new(time_stamp);
        let mut writer = XlsxWriter::new();

        for sheet in &config.sheets {
            let table_source = read_sheet_source(sheet)?;
            let layout = plan_sheet_layout(sheet, table_source.as_ref(), &ctx).map_err(
                |source| ReportError::Layout {
                    sheet: sheet.worksheet_name.clone(),
                    source,
                },
            )?;
            writer
                .write_layout(&layout)
                .map_err(|source| ReportError::Layout {
                    sheet: sheet.worksheet_name.clone(),
                    source,
                })?;
        }

        let v_xlsx = writer.save_to_buffer()?;
        let l_sheet_reports = writer.report();
        for report in &l_sheet_reports {
            l_warnings.extend(
                report
                    .warnings
                    .iter()
                    .map(|c_warning| format!("{}: {c_warning}", report.sheet_name)),
            );
        }
        tracing::info!(
            sheets = l_sheet_reports.len(),
            bytes = v_xlsx.len(),
            warnings = l_warnings.len(),
            "report built"
        );

        Ok(Self {
            config,
            time_stamp,
            v_xlsx,
            l_sheet_reports,
            l_warnings,
        })
    }

    /// Configuration the report was built from.
    pub fn config(&self) -> &SpecReportConfig {
        &self.config
    }

    /// Generation instant shared by every sheet.
    pub fn time_stamp(&self) -> NaiveDateTime {
        self.time_stamp
    }

    /// Worksheet names as written, in order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.l_sheet_reports
            .iter()
            .map(|report| report.sheet_name.clone())
            .collect()
    }

    /// Per-sheet write reports.
    pub fn sheet_reports(&self) -> &[SpecXlsxReport] {
        &self.l_sheet_reports
    }

    /// Non-fatal diagnostics from config validation and layout.
    pub fn warnings(&self) -> &[String] {
        &self.l_warnings
    }

    /// Serialized workbook.
    pub fn as_bytes(&self) -> &[u8] {
        &self.v_xlsx
    }

    /// Output file name configured for this run.
    pub fn file_name(&self) -> String {
        self.config.output.derive_file_name(&self.time_stamp)
    }

    /// Write the workbook to every configured output directory.
    pub fn serialize(&self) -> ReportWrite {
        let l_dirs = self.config.output.dir.to_vec();
        self.serialize_to(&l_dirs, &self.file_name())
    }

    /// Write the workbook as `file_name` into each of `dirs`.
    pub fn serialize_to<P>(&self, dirs: &[P], file_name: &str) -> ReportWrite
    where
        P: AsRef<Path>,
    {
        write_to_destinations(&self.v_xlsx, dirs, file_name)
    }
}

fn read_sheet_source(sheet: &SpecSheetConfig) -> Result<Option<SpecTable>, ReportError> {
    let (Some(dir_data), Some(c_base)) = (&sheet.data_directory, &sheet.base_filename) else {
        return Ok(None);
    };
    let path_file: PathBuf =
        find_latest_matching_file(dir_data, c_base).map_err(|source| ReportError::Locate {
            sheet: sheet.worksheet_name.clone(),
            source,
        })?;
    tracing::info!(
        sheet = sheet.worksheet_name.as_str(),
        file = %path_file.display(),
        "reading source table"
    );
    let table = read_delimited_table(&path_file, derive_delimiter_byte(sheet)?)?;
    Ok(Some(table))
}
