//! Write report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::spec::SpecWriteError;

/// Outcome of writing one serialized workbook to every destination.
#[derive(Debug, Default, Clone)]
pub struct ReportWrite {
    /// Destination files written successfully, in configured order.
    pub written: Vec<PathBuf>,
    /// Non-fatal warnings collected while writing.
    pub warnings: Vec<String>,
    /// Per-destination failures.
    pub errors: Vec<SpecWriteError>,
}

impl ReportWrite {
    /// Number of collected hard errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// True when every destination was written.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_written".to_string(), self.written.len() as u64);
        dict_counts.insert("cnt_errors".to_string(), self.error_count() as u64);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} written={} errors={} warnings={}",
            dict_counts["cnt_written"], dict_counts["cnt_errors"], dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[WRITE]"))
    }
}

/// Mutable accumulator for write results.
#[derive(Debug, Default, Clone)]
pub struct ReportWriteBuilder {
    /// See [`ReportWrite::written`].
    pub written: Vec<PathBuf>,
    /// See [`ReportWrite::warnings`].
    pub warnings: Vec<String>,
    /// See [`ReportWrite::errors`].
    pub errors: Vec<SpecWriteError>,
}

impl ReportWriteBuilder {
    /// Record one successfully written destination.
    pub fn add_written(&mut self, path: PathBuf) {
        self.written.push(path);
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Add one path-scoped error.
    pub fn add_error(&mut self, path: PathBuf, exception: String) {
        self.errors.push(SpecWriteError { path, exception });
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportWrite {
        ReportWrite {
            written: self.written,
            warnings: self.warnings,
            errors: self.errors,
        }
    }
}
