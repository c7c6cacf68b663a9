use std::sync::Arc;

use crate::{FileId, FileSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Hand one file to the converter.
    ConvertFile {
        file_id: FileId,
        name: String,
        source: FileSource,
    },
    /// Pack the converted files into one archive and deliver it.
    BuildArchive { entries: Vec<ArchiveEntry> },
}

/// One converted payload destined for the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub file_id: FileId,
    /// Original file name; the archive builder derives the entry path from it.
    pub name: String,
    pub jpeg: Arc<[u8]>,
}
