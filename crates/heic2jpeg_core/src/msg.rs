use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User dropped or picked a batch of files.
    FilesSelected(Vec<crate::SelectedFile>),
    /// Engine finished converting a file.
    ConversionSucceeded {
        file_id: crate::FileId,
        image: crate::ConvertedImage,
    },
    /// Engine gave up on a file. The cause is logged, not kept.
    ConversionFailed { file_id: crate::FileId },
    /// User asked for the archive.
    DownloadClicked,
    /// Engine finished (or failed) writing the archive.
    ArchiveFinished(ArchiveOutcome),
    /// User opened the error details.
    ShowErrorsClicked,
    /// User dismissed the error details.
    HideErrorsClicked,
    /// User cleared the error list.
    ClearErrorsClicked,
    /// Poll interval elapsed without an engine event.
    Tick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    Saved(ArchiveReport),
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    pub path: PathBuf,
    pub entry_count: usize,
    pub byte_len: u64,
}
