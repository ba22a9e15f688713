//! File discovery errors and write failure models.

use std::path::PathBuf;

use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// One destination write failure with path + error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecWriteError {
    /// Destination file that failed.
    pub path: PathBuf,
    /// User-facing error text.
    pub exception: String,
}

/// Input file discovery failures.
#[derive(Debug, Error)]
pub enum LocateFileError {
    /// Data directory does not exist or is not a directory.
    #[error("Data directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),
    /// Base filename could not be turned into a matcher.
    #[error("Invalid file pattern {pattern:?}: {message}")]
    InvalidPattern {
        /// Pattern text that failed to compile.
        pattern: String,
        /// Underlying matcher error text.
        message: String,
    },
    /// Directory has no file matching `<base_filename>*`.
    #[error("No file matching {pattern:?} in {}", .directory.display())]
    NoMatchingFile {
        /// Searched directory.
        directory: PathBuf,
        /// Searched pattern.
        pattern: String,
    },
    /// Directory listing or metadata read failed.
    #[error("Failed to scan {}: {source}", .path.display())]
    Io {
        /// Path being inspected.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
