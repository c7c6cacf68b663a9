use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::view_model::{AppViewModel, FileRowView, StatusLine};
use crate::{ArchiveEntry, ArchiveReport};

pub type FileId = u64;

/// Where the original payload of a selected file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

/// A file as handed over by the user, before it gets an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub source: FileSource,
}

impl SelectedFile {
    /// Name the file after the last component of `path`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = display_name(&path);
        Self {
            name,
            source: FileSource::Path(path),
        }
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            source: FileSource::Bytes(bytes.into()),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Small on-screen rendition of a converted image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub width: u32,
    pub height: u32,
    pub jpeg: Arc<[u8]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedImage {
    pub jpeg: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
    pub preview: Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Pending,
    Converted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertibleFile {
    pub id: FileId,
    pub name: String,
    pub result: Option<ConvertedImage>,
}

impl ConvertibleFile {
    pub fn status(&self) -> FileStatus {
        match self.result {
            Some(_) => FileStatus::Converted,
            None => FileStatus::Pending,
        }
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.result.as_ref().map(|image| &image.preview)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    files: Vec<ConvertibleFile>,
    errors: Vec<String>,
    errors_visible: bool,
    /// Ids packed by the outstanding archive request.
    generating: Option<Vec<FileId>>,
    last_archive: Option<ArchiveReport>,
    archive_error: Option<String>,
    next_file_id: FileId,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let files: Vec<FileRowView> = self
            .files
            .iter()
            .map(|file| FileRowView {
                id: file.id,
                name: file.name.clone(),
                status: file.status(),
                dimensions: file.result.as_ref().map(|img| (img.width, img.height)),
                preview_dimensions: file.preview().map(|p| (p.width, p.height)),
            })
            .collect();
        let pending_count = self.pending_count();

        AppViewModel {
            file_count: files.len(),
            pending_count,
            converted_count: files.len() - pending_count,
            files,
            errors: self.errors.clone(),
            error_count: self.errors.len(),
            errors_visible: self.errors_visible,
            generating: self.is_generating(),
            can_download: self.can_download(),
            status: self.status_line(),
            last_archive: self.last_archive.clone(),
            archive_error: self.archive_error.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything visible changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn files(&self) -> &[ConvertibleFile] {
        &self.files
    }

    pub fn file(&self, file_id: FileId) -> Option<&ConvertibleFile> {
        self.files.iter().find(|f| f.id == file_id)
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn is_generating(&self) -> bool {
        self.generating.is_some()
    }

    pub fn pending_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.status() == FileStatus::Pending)
            .count()
    }

    /// Download needs at least one file, none still converting, and no archive in flight.
    pub fn can_download(&self) -> bool {
        !self.files.is_empty() && self.pending_count() == 0 && !self.is_generating()
    }

    fn status_line(&self) -> StatusLine {
        if self.is_generating() {
            return StatusLine::Generating;
        }
        let remaining = self.pending_count();
        if remaining > 0 {
            StatusLine::Converting { remaining }
        } else if !self.files.is_empty() {
            StatusLine::Converted {
                count: self.files.len(),
            }
        } else {
            StatusLine::Idle
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Appends a pending placeholder for every file and returns what must be converted.
    pub(crate) fn enqueue_files(
        &mut self,
        selected: Vec<SelectedFile>,
    ) -> Vec<(FileId, SelectedFile)> {
        let mut enqueued = Vec::with_capacity(selected.len());
        for file in selected {
            self.next_file_id += 1;
            let id = self.next_file_id;
            self.files.push(ConvertibleFile {
                id,
                name: file.name.clone(),
                result: None,
            });
            enqueued.push((id, file));
        }
        if !enqueued.is_empty() {
            self.mark_dirty();
        }
        enqueued
    }

    pub(crate) fn apply_converted(&mut self, file_id: FileId, image: ConvertedImage) {
        let Some(file) = self
            .files
            .iter_mut()
            .find(|f| f.id == file_id && f.result.is_none())
        else {
            return;
        };
        file.result = Some(image);
        self.mark_dirty();
    }

    pub(crate) fn apply_failed(&mut self, file_id: FileId) {
        let Some(index) = self
            .files
            .iter()
            .position(|f| f.id == file_id && f.result.is_none())
        else {
            return;
        };
        let file = self.files.remove(index);
        self.errors.push(file.name);
        self.mark_dirty();
    }

    /// Marks the current files as being archived and returns their payloads.
    pub(crate) fn begin_archive(&mut self) -> Option<Vec<ArchiveEntry>> {
        if !self.can_download() {
            return None;
        }
        let entries: Vec<ArchiveEntry> = self
            .files
            .iter()
            .filter_map(|file| {
                file.result.as_ref().map(|image| ArchiveEntry {
                    file_id: file.id,
                    name: file.name.clone(),
                    jpeg: image.jpeg.clone(),
                })
            })
            .collect();
        self.generating = Some(entries.iter().map(|e| e.file_id).collect());
        self.archive_error = None;
        self.mark_dirty();
        Some(entries)
    }

    pub(crate) fn finish_archive_saved(&mut self, report: ArchiveReport) {
        let Some(archived) = self.generating.take() else {
            return;
        };
        self.files.retain(|f| !archived.contains(&f.id));
        self.errors.clear();
        self.errors_visible = false;
        self.last_archive = Some(report);
        self.mark_dirty();
    }

    pub(crate) fn finish_archive_failed(&mut self, message: String) {
        if self.generating.take().is_none() {
            return;
        }
        self.archive_error = Some(message);
        self.mark_dirty();
    }

    pub(crate) fn set_errors_visible(&mut self, visible: bool) {
        let visible = visible && !self.errors.is_empty();
        if self.errors_visible != visible {
            self.errors_visible = visible;
            self.mark_dirty();
        }
    }

    pub(crate) fn clear_errors(&mut self) {
        if self.errors.is_empty() && !self.errors_visible {
            return;
        }
        self.errors.clear();
        self.errors_visible = false;
        self.mark_dirty();
    }
}
