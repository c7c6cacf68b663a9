use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};

use crate::archive::{write_archive, ArchiveError, ArchiveSettings};
use crate::convert::{ConvertSettings, Converter, JpegConverter};
use crate::{ArchiveInput, EngineEvent, FileId, Source};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineSettings {
    pub convert: ConvertSettings,
    pub archive: ArchiveSettings,
}

enum EngineCommand {
    Convert { file_id: FileId, source: Source },
    BuildArchive { entries: Vec<ArchiveInput> },
}

/// Front door to the background runtime. Commands return immediately and
/// completions arrive as [`EngineEvent`]s in whatever order they finish.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> io::Result<Self> {
        let converter = Arc::new(JpegConverter::new(settings.convert));
        Self::with_converter(converter, settings.archive)
    }

    pub fn with_converter(
        converter: Arc<dyn Converter>,
        archive: ArchiveSettings,
    ) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .thread_name("heic2jpeg-engine")
            .enable_all()
            .build()?;
        let archive = Arc::new(archive);

        thread::Builder::new()
            .name("heic2jpeg-commands".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let converter = converter.clone();
                    let archive = archive.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        handle_command(converter.as_ref(), &archive, command, event_tx).await;
                    });
                }
                // Let in-flight work finish before the runtime goes away.
                runtime.shutdown_timeout(Duration::from_secs(30));
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn convert(&self, file_id: FileId, source: Source) {
        if self
            .cmd_tx
            .send(EngineCommand::Convert { file_id, source })
            .is_err()
        {
            engine_warn!("Engine stopped; dropping conversion of file_id={}", file_id);
        }
    }

    pub fn build_archive(&self, entries: Vec<ArchiveInput>) {
        if self
            .cmd_tx
            .send(EngineCommand::BuildArchive { entries })
            .is_err()
        {
            engine_warn!("Engine stopped; dropping archive request");
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    converter: &dyn Converter,
    archive: &ArchiveSettings,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::Convert { file_id, source } => {
            engine_debug!("Converting file_id={}", file_id);
            let result = converter.convert(file_id, &source).await;
            EngineEvent::ConversionCompleted { file_id, result }
        }
        EngineCommand::BuildArchive { entries } => {
            let settings = archive.clone();
            let result = tokio::task::spawn_blocking(move || write_archive(&entries, &settings))
                .await
                .unwrap_or_else(|err| Err(ArchiveError::Io(io::Error::other(err))));
            EngineEvent::ArchiveCompleted { result }
        }
    };
    let _ = event_tx.send(event);
}
