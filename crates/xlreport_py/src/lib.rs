use std::collections::BTreeMap;
use std::path::PathBuf;

use pyo3::exceptions::{PyFileNotFoundError, PyOSError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use xlreport::{ExcelReport, ReportError, ReportWrite, SpecWriteError};
use xlreport_io_fs::LocateFileError;

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "xlreport.excel_report.v1";
const C_BRIDGE_TRANSPORT: &str = "rust_native";
const C_FMT_TIME_STAMP_ISO: &str = "%Y-%m-%dT%H:%M:%S";

#[pyclass(name = "SpecWriteError")]
#[derive(Debug, Clone)]
struct PySpecWriteError {
    #[pyo3(get)]
    path: String,
    #[pyo3(get)]
    exception: String,
}

impl From<SpecWriteError> for PySpecWriteError {
    fn from(spec_error: SpecWriteError) -> Self {
        Self {
            path: spec_error.path.to_string_lossy().to_string(),
            exception: spec_error.exception,
        }
    }
}

#[pyclass(name = "ReportWrite")]
#[derive(Debug, Clone)]
struct PyReportWrite {
    #[pyo3(get)]
    written: Vec<String>,
    #[pyo3(get)]
    warnings: Vec<String>,
    #[pyo3(get)]
    errors: Vec<PySpecWriteError>,
}

impl From<ReportWrite> for PyReportWrite {
    fn from(report_write: ReportWrite) -> Self {
        Self {
            written: report_write
                .written
                .iter()
                .map(|path| path.to_string_lossy().to_string())
                .collect(),
            warnings: report_write.warnings,
            errors: report_write
                .errors
                .into_iter()
                .map(PySpecWriteError::from)
                .collect(),
        }
    }
}

#[pymethods]
impl PyReportWrite {
    #[getter]
    fn error_count(&self) -> usize {
        self.errors.len()
    }

    #[getter]
    fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_written".to_string(), self.written.len() as u64);
        dict_counts.insert("cnt_errors".to_string(), self.error_count() as u64);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    #[pyo3(signature = (prefix = "[WRITE]"))]
    fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} written={} errors={} warnings={}",
            self.written.len(),
            self.error_count(),
            self.warning_count()
        )
    }

    fn __str__(&self) -> String {
        self.format("[WRITE]")
    }
}

#[pyclass(name = "ExcelReport")]
struct PyExcelReport {
    #[pyo3(get)]
    conf_filename: String,
    inner: ExcelReport,
}

#[pymethods]
impl PyExcelReport {
    #[new]
    fn new(py: Python<'_>, conf_filename: String) -> PyResult<Self> {
        let inner = py
            .allow_threads(|| ExcelReport::from_file(&conf_filename))
            .map_err(map_report_error)?;
        Ok(Self {
            conf_filename,
            inner,
        })
    }

    #[getter]
    fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names()
    }

    #[getter]
    fn warnings(&self) -> Vec<String> {
        self.inner.warnings().to_vec()
    }

    #[getter]
    fn time_stamp(&self) -> String {
        self.inner
            .time_stamp()
            .format(C_FMT_TIME_STAMP_ISO)
            .to_string()
    }

    #[getter]
    fn file_name(&self) -> String {
        self.inner.file_name()
    }

    #[pyo3(signature = (dirs_output = None, file_name = None))]
    fn serialize(
        &self,
        py: Python<'_>,
        dirs_output: Option<Vec<String>>,
        file_name: Option<String>,
    ) -> PyReportWrite {
        let report_write = py.allow_threads(|| match (dirs_output, file_name) {
            (None, None) => self.inner.serialize(),
            (dirs_output, file_name) => {
                let l_dirs: Vec<PathBuf> = match dirs_output {
                    Some(l_dirs) => l_dirs.into_iter().map(PathBuf::from).collect(),
                    None => self.inner.config().output.dir.to_vec(),
                };
                let c_file_name = file_name.unwrap_or_else(|| self.inner.file_name());
                self.inner.serialize_to(&l_dirs, &c_file_name)
            }
        });
        PyReportWrite::from(report_write)
    }

    fn __repr__(&self) -> String {
        format!(
            "ExcelReport(conf_filename={:?}, sheets={:?})",
            self.conf_filename,
            self.inner.sheet_names()
        )
    }
}

fn map_report_error(exception: ReportError) -> PyErr {
    match exception {
        ReportError::ConfigRead { .. } | ReportError::TableRead { .. } => {
            PyOSError::new_err(exception.to_string())
        }
        ReportError::Locate { ref source, .. } => match source {
            LocateFileError::DirectoryNotFound(_) | LocateFileError::NoMatchingFile { .. } => {
                PyFileNotFoundError::new_err(exception.to_string())
            }
            LocateFileError::InvalidPattern { .. } => PyValueError::new_err(exception.to_string()),
            LocateFileError::Io { .. } => PyOSError::new_err(exception.to_string()),
        },
        ReportError::ConfigParse { .. }
        | ReportError::ConfigInvalid(_)
        | ReportError::Layout { .. } => PyValueError::new_err(exception.to_string()),
        ReportError::Xlsx(_) => PyRuntimeError::new_err(exception.to_string()),
    }
}

#[pymodule]
fn _xlreport_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PySpecWriteError>()?;
    module.add_class::<PyReportWrite>()?;
    module.add_class::<PyExcelReport>()?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}
