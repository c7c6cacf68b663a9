use crate::{ArchiveReport, FileId, FileStatus};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub files: Vec<FileRowView>,
    pub file_count: usize,
    pub pending_count: usize,
    pub converted_count: usize,
    pub errors: Vec<String>,
    pub error_count: usize,
    pub errors_visible: bool,
    pub generating: bool,
    pub can_download: bool,
    pub status: StatusLine,
    pub last_archive: Option<ArchiveReport>,
    pub archive_error: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRowView {
    pub id: FileId,
    pub name: String,
    pub status: FileStatus,
    pub dimensions: Option<(u32, u32)>,
    pub preview_dimensions: Option<(u32, u32)>,
}

/// One-line summary shown next to the download action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusLine {
    #[default]
    Idle,
    Converting { remaining: usize },
    Converted { count: usize },
    Generating,
}
