//! Latest-matching input file discovery.

use std::fs;
use std::path::{Path, PathBuf};

use crate::spec::LocateFileError;
use crate::util::{compile_prefix_matcher, derive_modification_time, derive_prefix_pattern};

/// Return the most recently modified file in `dir_data` whose name starts
/// with `base_filename`.
///
/// Only regular files directly inside `dir_data` are considered. Equal
/// modification times are broken by the lexicographically greatest name,
/// so the result is stable across directory iteration orders.
pub fn find_latest_matching_file<P>(
    dir_data: P,
    base_filename: &str,
) -> Result<PathBuf, LocateFileError>
where
    P: AsRef<Path>,
{
    let path_dir_data = dir_data.as_ref();
    if !path_dir_data.is_dir() {
        return Err(LocateFileError::DirectoryNotFound(
            path_dir_data.to_path_buf(),
        ));
    }

    let matcher = compile_prefix_matcher(base_filename)?;
    let iter_entries = fs::read_dir(path_dir_data).map_err(|source| LocateFileError::Io {
        path: path_dir_data.to_path_buf(),
        source,
    })?;

    let mut best_candidate = None;
    for entry in iter_entries {
        let entry = entry.map_err(|source| LocateFileError::Io {
            path: path_dir_data.to_path_buf(),
            source,
        })?;
        let path_entry = entry.path();
        if !path_entry.is_file() {
            continue;
        }
        let name_file = entry.file_name().to_string_lossy().to_string();
        if !matcher.is_match(&name_file) {
            continue;
        }

        let file_time_modify = derive_modification_time(&path_entry)?;
        let key_candidate = (file_time_modify, name_file);
        match &best_candidate {
            Some((key_best, _)) if *key_best >= key_candidate => {}
            _ => best_candidate = Some((key_candidate, path_entry)),
        }
    }

    match best_candidate {
        Some((_, path_file)) => {
            tracing::debug!(file = %path_file.display(), "selected latest input file");
            Ok(path_file)
        }
        None => Err(LocateFileError::NoMatchingFile {
            directory: path_dir_data.to_path_buf(),
            pattern: derive_prefix_pattern(base_filename),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use filetime::{FileTime, set_file_mtime};

    use super::find_latest_matching_file;
    use crate::spec::LocateFileError;

    fn write_with_mtime(path: &Path, txt: &str, n_secs: i64) {
        std::fs::write(path, txt).expect("write text");
        set_file_mtime(path, FileTime::from_unix_time(n_secs, 0)).expect("set mtime");
    }

    #[test]
    fn latest_match_uses_modification_time_not_name() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_with_mtime(&tmp.path().join("scores_2024-03.csv"), "a", 1_000);
        write_with_mtime(&tmp.path().join("scores_2024-01.csv"), "b", 3_000);
        write_with_mtime(&tmp.path().join("other_2025.csv"), "c", 9_000);

        let path_found = find_latest_matching_file(tmp.path(), "scores_").expect("found");
        assert_eq!(
            path_found.file_name().and_then(|n| n.to_str()),
            Some("scores_2024-01.csv")
        );
    }

    #[test]
    fn latest_match_breaks_ties_by_name() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_with_mtime(&tmp.path().join("log_a.csv"), "a", 5_000);
        write_with_mtime(&tmp.path().join("log_b.csv"), "b", 5_000);

        let path_found = find_latest_matching_file(tmp.path(), "log_").expect("found");
        assert!(path_found.ends_with("log_b.csv"));
    }

    #[test]
    fn latest_match_ignores_directories() {
        let tmp = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(tmp.path().join("scores_dir")).expect("mkdir");
        write_with_mtime(&tmp.path().join("scores_1.csv"), "a", 1_000);

        let path_found = find_latest_matching_file(tmp.path(), "scores_").expect("found");
        assert!(path_found.ends_with("scores_1.csv"));
    }

    #[test]
    fn latest_match_reports_missing_inputs() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let err = find_latest_matching_file(tmp.path(), "nothing_").expect_err("no match");
        assert!(matches!(err, LocateFileError::NoMatchingFile { .. }));

        let err = find_latest_matching_file(tmp.path().join("absent"), "x").expect_err("no dir");
        assert!(matches!(err, LocateFileError::DirectoryNotFound(_)));
    }
}
