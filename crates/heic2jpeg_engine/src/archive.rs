use std::io::{Cursor, Write};
use std::path::PathBuf;

use engine_logging::engine_info;
use serde::Deserialize;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::filename::unique_entry_names;
use crate::persist::{AtomicFileWriter, PersistError};
use crate::ArchiveInput;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ArchiveSettings {
    pub output_dir: PathBuf,
    pub archive_name: String,
    /// Folder inside the archive that holds the images; empty for the root.
    pub entry_dir: String,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            archive_name: "images.zip".to_string(),
            entry_dir: "images".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub entry_names: Vec<String>,
    pub byte_len: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("nothing to archive")]
    Empty,
    #[error("invalid archive name {0:?}")]
    InvalidName(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Serialize `entries` into an in-memory zip; returns the bytes and the entry paths used.
pub fn build_archive(
    entries: &[ArchiveInput],
    entry_dir: &str,
) -> Result<(Vec<u8>, Vec<String>), ArchiveError> {
    if entries.is_empty() {
        return Err(ArchiveError::Empty);
    }

    let prefix = match entry_dir.trim_matches('/') {
        "" => String::new(),
        dir => format!("{dir}/"),
    };
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    if !prefix.is_empty() {
        zip.add_directory(prefix.as_str(), options)?;
    }

    let names = unique_entry_names(entries.iter().map(|e| e.name.as_str()));
    let mut paths = Vec::with_capacity(entries.len());
    for (entry, name) in entries.iter().zip(names) {
        let path = format!("{prefix}{name}");
        zip.start_file(path.as_str(), options)?;
        zip.write_all(&entry.jpeg)?;
        paths.push(path);
    }

    let cursor = zip.finish()?;
    Ok((cursor.into_inner(), paths))
}

/// Build the archive and write it atomically to `output_dir/archive_name`.
pub fn write_archive(
    entries: &[ArchiveInput],
    settings: &ArchiveSettings,
) -> Result<ArchiveSummary, ArchiveError> {
    let name = settings.archive_name.trim();
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(ArchiveError::InvalidName(settings.archive_name.clone()));
    }

    let (bytes, entry_names) = build_archive(entries, &settings.entry_dir)?;
    let writer = AtomicFileWriter::new(settings.output_dir.clone());
    let path = writer.write(name, &bytes)?;

    engine_info!(
        "Wrote archive {:?} with {} entries ({} bytes)",
        path,
        entry_names.len(),
        bytes.len()
    );
    Ok(ArchiveSummary {
        path,
        entry_names,
        byte_len: bytes.len() as u64,
    })
}
