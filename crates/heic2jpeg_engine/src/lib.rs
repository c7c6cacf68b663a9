//! Heic2jpeg engine: image conversion, archive building and effect execution.
mod archive;
mod convert;
mod decode;
mod engine;
mod filename;
mod persist;
mod preview;
mod types;

pub use archive::{build_archive, write_archive, ArchiveError, ArchiveSettings, ArchiveSummary};
pub use convert::{encode_jpeg, jpeg_quality, ConvertSettings, Converter, JpegConverter};
pub use decode::{sniff_format, SourceFormat};
pub use engine::{EngineHandle, EngineSettings};
pub use filename::{archive_entry_name, unique_entry_names};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use preview::{render_preview, DEFAULT_PREVIEW_EDGE};
pub use types::{
    ArchiveInput, ConversionOutput, ConvertError, ConvertFailureKind, EngineEvent, FileId,
    PreviewImage, Source,
};
