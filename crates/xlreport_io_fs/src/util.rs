use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use globset::{Glob, GlobMatcher};

use crate::report::ReportWriteBuilder;
use crate::spec::LocateFileError;

////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

/// Build the `<base_filename>*` pattern text, escaping glob metacharacters.
pub(crate) fn derive_prefix_pattern(base_filename: &str) -> String {
    format!("{}*", globset::escape(base_filename))
}

pub(crate) fn compile_prefix_matcher(base_filename: &str) -> Result<GlobMatcher, LocateFileError> {
    let c_pattern = derive_prefix_pattern(base_filename);
    Glob::new(&c_pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|e| LocateFileError::InvalidPattern {
            pattern: c_pattern,
            message: e.to_string(),
        })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

pub(crate) fn derive_modification_time(path: &Path) -> Result<FileTime, LocateFileError> {
    let stat = fs::metadata(path).map_err(|source| LocateFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(FileTime::from_last_modification_time(&stat))
}

/// Create the destination directory when missing.
pub(crate) fn ensure_destination_dir(path_dir_dst: &Path) -> Result<(), io::Error> {
    if path_dir_dst.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path_dir_dst)
}

/// Record an error and return `true` when the destination cannot receive a file.
pub(crate) fn should_skip_destination(
    path_file_dst: &Path,
    builder_wr_report: &mut ReportWriteBuilder,
) -> bool {
    if path_file_dst.is_dir() {
        builder_wr_report.add_error(
            path_file_dst.to_path_buf(),
            format!("Destination is a directory: {}", path_file_dst.display()),
        );
        return true;
    }
    if path_file_dst.exists() {
        builder_wr_report.add_warning(format!(
            "Overwriting existing file: {}",
            path_file_dst.display()
        ));
    }
    false
}

pub(crate) fn derive_destination_path(path_dir_dst: &Path, file_name: &str) -> PathBuf {
    path_dir_dst.join(file_name)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_pattern_escapes_glob_metacharacters() {
        assert_eq!(derive_prefix_pattern("scores_"), "scores_*");
        let matcher = compile_prefix_matcher("run[1]").expect("matcher");
        assert!(matcher.is_match("run[1]-2024.csv"));
        assert!(!matcher.is_match("run1-2024.csv"));
    }
}
