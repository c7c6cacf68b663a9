use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::archive::{ArchiveError, ArchiveSummary};

pub type FileId = u64;

/// Original payload handed to the converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutput {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub preview: PreviewImage,
}

/// A named JPEG payload to be packed into the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveInput {
    pub name: String,
    pub jpeg: Arc<[u8]>,
}

#[derive(Debug)]
pub enum EngineEvent {
    ConversionCompleted {
        file_id: FileId,
        result: Result<ConversionOutput, ConvertError>,
    },
    ArchiveCompleted {
        result: Result<ArchiveSummary, ArchiveError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertError {
    pub kind: ConvertFailureKind,
    pub message: String,
}

impl ConvertError {
    pub(crate) fn new(kind: ConvertFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for ConvertError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertFailureKind {
    Read,
    TooLarge { max_bytes: u64, actual: u64 },
    UnsupportedFormat,
    DecoderUnavailable { program: String },
    DecoderFailed { status: Option<i32> },
    Decode,
    Encode,
    Cancelled,
}

impl fmt::Display for ConvertFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertFailureKind::Read => write!(f, "could not read source"),
            ConvertFailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "source too large (max {max_bytes}, actual {actual})")
            }
            ConvertFailureKind::UnsupportedFormat => write!(f, "unsupported image format"),
            ConvertFailureKind::DecoderUnavailable { program } => {
                write!(f, "HEIF decoder {program} is not available")
            }
            ConvertFailureKind::DecoderFailed { status: Some(code) } => {
                write!(f, "HEIF decoder exited with status {code}")
            }
            ConvertFailureKind::DecoderFailed { status: None } => {
                write!(f, "HEIF decoder was terminated")
            }
            ConvertFailureKind::Decode => write!(f, "decode error"),
            ConvertFailureKind::Encode => write!(f, "encode error"),
            ConvertFailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}
