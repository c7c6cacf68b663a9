//! Heic2jpeg core: pure conversion-batch state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{ArchiveEntry, Effect};
pub use msg::{ArchiveOutcome, ArchiveReport, Msg};
pub use state::{
    AppState, ConvertedImage, ConvertibleFile, FileId, FileSource, FileStatus, Preview,
    SelectedFile,
};
pub use update::update;
pub use view_model::{AppViewModel, FileRowView, StatusLine};
