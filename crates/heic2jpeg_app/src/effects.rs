use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use engine_logging::{engine_error, engine_info, engine_warn};
use heic2jpeg_core::{
    ArchiveOutcome, ArchiveReport, ConvertedImage, Effect, FileId, FileSource, Msg, Preview,
};
use heic2jpeg_engine::{
    archive_entry_name, ArchiveInput, AtomicFileWriter, ConversionOutput, EngineEvent,
    EngineHandle, PreviewImage, Source,
};

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    preview_dir: Option<PathBuf>,
    /// Names of conversions in flight, for logging and preview file names.
    names: HashMap<FileId, String>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, preview_dir: Option<PathBuf>) -> Self {
        Self {
            engine,
            preview_dir,
            names: HashMap::new(),
        }
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ConvertFile {
                    file_id,
                    name,
                    source,
                } => {
                    engine_info!("ConvertFile file_id={} name={}", file_id, name);
                    self.names.insert(file_id, name);
                    self.engine.convert(file_id, map_source(source));
                }
                Effect::BuildArchive { entries } => {
                    engine_info!("BuildArchive entries={}", entries.len());
                    let inputs = entries
                        .into_iter()
                        .map(|entry| ArchiveInput {
                            name: entry.name,
                            jpeg: entry.jpeg,
                        })
                        .collect();
                    self.engine.build_archive(inputs);
                }
            }
        }
    }

    /// Wait up to `timeout` for the next engine completion.
    pub fn next_msg(&mut self, timeout: Duration) -> Option<Msg> {
        let event = self.engine.recv_timeout(timeout)?;
        Some(self.map_event(event))
    }

    fn map_event(&mut self, event: EngineEvent) -> Msg {
        match event {
            EngineEvent::ConversionCompleted { file_id, result } => {
                let name = self.names.remove(&file_id).unwrap_or_default();
                match result {
                    Ok(output) => {
                        self.write_preview(file_id, &name, &output.preview);
                        Msg::ConversionSucceeded {
                            file_id,
                            image: map_output(output),
                        }
                    }
                    Err(err) => {
                        engine_warn!(
                            "Conversion of {} (file_id={}) failed: {}",
                            name,
                            file_id,
                            err
                        );
                        Msg::ConversionFailed { file_id }
                    }
                }
            }
            EngineEvent::ArchiveCompleted { result } => match result {
                Ok(summary) => Msg::ArchiveFinished(ArchiveOutcome::Saved(ArchiveReport {
                    path: summary.path,
                    entry_count: summary.entry_names.len(),
                    byte_len: summary.byte_len,
                })),
                Err(err) => {
                    engine_error!("Archive failed: {}", err);
                    Msg::ArchiveFinished(ArchiveOutcome::Failed {
                        message: err.to_string(),
                    })
                }
            },
        }
    }

    fn write_preview(&self, file_id: FileId, name: &str, preview: &PreviewImage) {
        let Some(dir) = &self.preview_dir else {
            return;
        };
        let entry = archive_entry_name(name);
        let stem = entry.strip_suffix(".jpeg").unwrap_or(&entry);
        let filename = format!("{stem}-{file_id}.preview.jpeg");
        if let Err(err) = AtomicFileWriter::new(dir.clone()).write(&filename, &preview.jpeg) {
            engine_warn!("Failed to write preview {:?} into {:?}: {}", filename, dir, err);
        }
    }
}

fn map_source(source: FileSource) -> Source {
    match source {
        FileSource::Path(path) => Source::Path(path),
        FileSource::Bytes(bytes) => Source::Bytes(bytes),
    }
}

fn map_output(output: ConversionOutput) -> ConvertedImage {
    ConvertedImage {
        jpeg: output.jpeg.into(),
        width: output.width,
        height: output.height,
        preview: Preview {
            width: output.preview.width,
            height: output.preview.height,
            jpeg: output.preview.jpeg.into(),
        },
    }
}
