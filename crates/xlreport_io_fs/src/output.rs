//! Multi-destination output write.

use std::fs;
use std::path::Path;

use crate::report::{ReportWrite, ReportWriteBuilder};
use crate::util::{derive_destination_path, ensure_destination_dir, should_skip_destination};

/// Write `content` as `file_name` into every directory of `dirs_destination`.
///
/// Destinations are processed in order. A failing destination is recorded
/// in the returned [`ReportWrite`] and never prevents the remaining ones;
/// nothing is retried or rolled back.
pub fn write_to_destinations<P>(
    content: &[u8],
    dirs_destination: &[P],
    file_name: &str,
) -> ReportWrite
where
    P: AsRef<Path>,
{
    let mut builder_wr_report = ReportWriteBuilder::default();

    for dir_destination in dirs_destination {
        let path_dir_dst = dir_destination.as_ref();
        let path_file_dst = derive_destination_path(path_dir_dst, file_name);

        if let Err(e) = ensure_destination_dir(path_dir_dst) {
            tracing::warn!(dir = %path_dir_dst.display(), "cannot create destination: {e}");
            builder_wr_report.add_error(
                path_file_dst,
                format!(
                    "Failed to create destination {}: {e}",
                    path_dir_dst.display()
                ),
            );
            continue;
        }
        if should_skip_destination(&path_file_dst, &mut builder_wr_report) {
            continue;
        }

        match fs::write(&path_file_dst, content) {
            Ok(()) => {
                tracing::info!(file = %path_file_dst.display(), "workbook written");
                builder_wr_report.add_written(path_file_dst);
            }
            Err(e) => {
                tracing::warn!(file = %path_file_dst.display(), "workbook write failed: {e}");
                builder_wr_report.add_error(path_file_dst, e.to_string());
            }
        }
    }

    builder_wr_report.build()
}
