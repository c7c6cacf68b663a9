//! Text rendering of the view model for the terminal.

use heic2jpeg_core::{AppViewModel, ArchiveReport, FileRowView, FileStatus, StatusLine};

pub const NOTHING_TO_ARCHIVE: &str = "No image could be converted; no archive written.";

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

pub fn status_text(status: StatusLine) -> String {
    match status {
        StatusLine::Idle => "No files".to_string(),
        StatusLine::Converting { remaining } => {
            format!("Converting {}...", plural(remaining, "file", "files"))
        }
        StatusLine::Converted { count } => {
            format!("{} converted", plural(count, "file", "files"))
        }
        StatusLine::Generating => "Generating archive...".to_string(),
    }
}

/// Status line plus the error badge, when there are errors.
pub fn status_frame(view: &AppViewModel) -> String {
    let status = status_text(view.status);
    if view.error_count == 0 {
        status
    } else {
        format!(
            "{status} | {} occurred",
            plural(view.error_count, "error", "errors")
        )
    }
}

/// One line per converted file, in selection order.
pub fn file_row(row: &FileRowView) -> String {
    match (row.status, row.dimensions) {
        (FileStatus::Converted, Some((width, height))) => {
            let preview = row
                .preview_dimensions
                .map(|(w, h)| format!(", preview {w}x{h}"))
                .unwrap_or_default();
            format!("  {} ({width}x{height}{preview})", row.name)
        }
        _ => format!("  {} (converting)", row.name),
    }
}

pub fn error_dialog(errors: &[String]) -> Vec<String> {
    let mut lines = Vec::with_capacity(errors.len() + 1);
    lines.push(format!(
        "{} while converting:",
        plural(errors.len(), "error", "errors")
    ));
    lines.extend(errors.iter().map(|name| format!("  x {name}")));
    lines
}

pub fn archive_saved(report: &ArchiveReport) -> String {
    format!(
        "Saved {} to {} ({} bytes)",
        plural(report.entry_count, "image", "images"),
        report.path.display(),
        report.byte_len
    )
}

pub fn archive_failed(message: &str) -> String {
    format!("Could not write the archive: {message}")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use heic2jpeg_core::{AppViewModel, ArchiveReport, FileRowView, FileStatus, StatusLine};

    use super::{archive_saved, error_dialog, file_row, status_frame, status_text};

    #[test]
    fn status_lines_read_naturally() {
        assert_eq!(status_text(StatusLine::Idle), "No files");
        assert_eq!(
            status_text(StatusLine::Converting { remaining: 1 }),
            "Converting 1 file..."
        );
        assert_eq!(
            status_text(StatusLine::Converted { count: 3 }),
            "3 files converted"
        );
        assert_eq!(status_text(StatusLine::Generating), "Generating archive...");
    }

    #[test]
    fn badge_is_appended_only_with_errors() {
        let mut view = AppViewModel {
            status: StatusLine::Converted { count: 2 },
            ..AppViewModel::default()
        };
        assert_eq!(status_frame(&view), "2 files converted");

        view.error_count = 1;
        assert_eq!(status_frame(&view), "2 files converted | 1 error occurred");
    }

    #[test]
    fn dialog_lists_every_failed_file() {
        let lines = error_dialog(&["B.heic".to_string(), "D.heic".to_string()]);
        assert_eq!(
            lines,
            vec!["2 errors while converting:", "  x B.heic", "  x D.heic"]
        );
    }

    #[test]
    fn rows_show_dimensions_once_converted() {
        let mut row = FileRowView {
            id: 1,
            name: "IMG_0001.HEIC".to_string(),
            status: FileStatus::Pending,
            dimensions: None,
            preview_dimensions: None,
        };
        assert_eq!(file_row(&row), "  IMG_0001.HEIC (converting)");

        row.status = FileStatus::Converted;
        row.dimensions = Some((4032, 3024));
        row.preview_dimensions = Some((200, 150));
        assert_eq!(
            file_row(&row),
            "  IMG_0001.HEIC (4032x3024, preview 200x150)"
        );
    }

    #[test]
    fn saved_report_names_the_archive() {
        let report = ArchiveReport {
            path: PathBuf::from("out/images.zip"),
            entry_count: 2,
            byte_len: 2048,
        };
        assert_eq!(
            archive_saved(&report),
            format!("Saved 2 images to {} (2048 bytes)", report.path.display())
        );
    }
}
