use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use engine_logging::engine_info;
use heic2jpeg_core::{update, AppState, ArchiveReport, Msg, SelectedFile};
use heic2jpeg_engine::EngineHandle;

use crate::args::Cli;
use crate::config::AppConfig;
use crate::effects::EffectRunner;
use crate::render;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = AppConfig::load(cli.config.as_deref())?.with_overrides(&cli);
    let engine =
        EngineHandle::new(config.engine_settings()).context("failed to start the engine")?;
    let runner = EffectRunner::new(engine, cli.preview_dir.clone());

    let files = cli.files.iter().map(SelectedFile::from_path).collect();
    let outcome = Session::new(runner).run(files, &mut io::stdout().lock())?;
    engine_info!(
        "Session finished: converted={} failed={} archived={}",
        outcome.converted,
        outcome.failed,
        outcome.archive.is_some()
    );

    Ok(if outcome.archive.is_some() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[derive(Debug)]
pub struct SessionOutcome {
    pub converted: usize,
    pub failed: usize,
    pub archive: Option<ArchiveReport>,
}

/// Drives one batch through the state machine: convert, report errors, archive.
pub struct Session {
    state: AppState,
    runner: EffectRunner,
    last_status: Option<String>,
    dialog_shown: bool,
}

impl Session {
    pub fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
            last_status: None,
            dialog_shown: false,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
    }

    fn render(&mut self, out: &mut impl Write) -> io::Result<()> {
        if !self.state.consume_dirty() {
            return Ok(());
        }
        let view = self.state.view();

        let status = render::status_frame(&view);
        if self.last_status.as_deref() != Some(status.as_str()) {
            writeln!(out, "{status}")?;
            self.last_status = Some(status);
        }

        if view.errors_visible && !self.dialog_shown {
            for line in render::error_dialog(&view.errors) {
                writeln!(out, "{line}")?;
            }
        }
        self.dialog_shown = view.errors_visible;
        Ok(())
    }

    fn wait_while(
        &mut self,
        out: &mut impl Write,
        busy: impl Fn(&AppState) -> bool,
    ) -> io::Result<()> {
        while busy(&self.state) {
            let msg = self.runner.next_msg(POLL_INTERVAL).unwrap_or(Msg::Tick);
            self.dispatch(msg);
            self.render(out)?;
        }
        Ok(())
    }

    pub fn run(
        mut self,
        files: Vec<SelectedFile>,
        out: &mut impl Write,
    ) -> anyhow::Result<SessionOutcome> {
        let selected = files.len();
        self.dispatch(Msg::FilesSelected(files));
        self.render(out)?;
        self.wait_while(out, |state| state.pending_count() > 0)?;

        let failed = self.state.errors().len();
        let converted = selected.saturating_sub(failed);
        for row in &self.state.view().files {
            writeln!(out, "{}", render::file_row(row))?;
        }

        if failed > 0 {
            self.dispatch(Msg::ShowErrorsClicked);
            self.render(out)?;
            self.dispatch(Msg::HideErrorsClicked);
            self.render(out)?;
        }

        if !self.state.can_download() {
            writeln!(out, "{}", render::NOTHING_TO_ARCHIVE)?;
            return Ok(SessionOutcome {
                converted,
                failed,
                archive: None,
            });
        }

        self.dispatch(Msg::DownloadClicked);
        self.render(out)?;
        self.wait_while(out, AppState::is_generating)?;

        let view = self.state.view();
        if let Some(message) = &view.archive_error {
            writeln!(out, "{}", render::archive_failed(message))?;
        } else if let Some(report) = &view.last_archive {
            writeln!(out, "{}", render::archive_saved(report))?;
        }

        let archive = match view.archive_error {
            Some(_) => None,
            None => view.last_archive,
        };
        Ok(SessionOutcome {
            converted,
            failed,
            archive,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::path::PathBuf;
    use std::sync::Arc;

    use async_trait::async_trait;
    use heic2jpeg_core::SelectedFile;
    use heic2jpeg_engine::{
        ArchiveSettings, ConversionOutput, ConvertError, ConvertFailureKind, Converter,
        EngineHandle, FileId, PreviewImage, Source,
    };
    use tempfile::TempDir;

    use super::Session;
    use crate::effects::EffectRunner;

    /// Fails files whose stem is `B`; echoes the path bytes as the "jpeg" otherwise.
    struct NamedFailures;

    #[async_trait]
    impl Converter for NamedFailures {
        async fn convert(
            &self,
            _file_id: FileId,
            source: &Source,
        ) -> Result<ConversionOutput, ConvertError> {
            let Source::Path(path) = source else {
                panic!("sessions only use paths");
            };
            if path.file_stem().and_then(|s| s.to_str()) == Some("B") {
                return Err(ConvertError {
                    kind: ConvertFailureKind::Decode,
                    message: "bad image".to_string(),
                });
            }
            Ok(ConversionOutput {
                jpeg: path.to_string_lossy().as_bytes().to_vec(),
                width: 4,
                height: 3,
                preview: PreviewImage {
                    width: 4,
                    height: 3,
                    jpeg: vec![0xFF, 0xD8, 0xFF, 0xD9],
                },
            })
        }
    }

    fn session(out_dir: &TempDir, preview_dir: Option<&TempDir>) -> Session {
        session_writing_to(out_dir.path().to_path_buf(), preview_dir)
    }

    fn session_writing_to(output_dir: PathBuf, preview_dir: Option<&TempDir>) -> Session {
        let settings = ArchiveSettings {
            output_dir,
            ..ArchiveSettings::default()
        };
        let engine = EngineHandle::with_converter(Arc::new(NamedFailures), settings).unwrap();
        Session::new(EffectRunner::new(
            engine,
            preview_dir.map(|dir| dir.path().to_path_buf()),
        ))
    }

    #[test]
    fn failed_file_is_reported_and_left_out_of_the_archive() {
        let out_dir = TempDir::new().unwrap();
        let files = ["A.heic", "B.heic", "C.heic"]
            .into_iter()
            .map(SelectedFile::from_path)
            .collect();

        let mut out: Vec<u8> = Vec::new();
        let outcome = session(&out_dir, None).run(files, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(outcome.converted, 2);
        assert_eq!(outcome.failed, 1);
        let report = outcome.archive.expect("archive written");
        assert_eq!(report.entry_count, 2);
        assert_eq!(report.path, out_dir.path().join("images.zip"));

        assert!(text.contains("1 error while converting:"), "{text}");
        assert!(text.contains("  x B.heic"), "{text}");
        assert!(text.contains("Saved 2 images to"), "{text}");
        assert!(text.contains("  A.heic (4x3, preview 4x3)"), "{text}");

        let mut zip = zip_reader(&report.path);
        let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(
            names,
            vec!["images/", "images/A.jpeg", "images/C.jpeg"]
        );
        assert!(zip.by_name("images/B.jpeg").is_err());
    }

    #[test]
    fn nothing_is_written_when_every_file_fails() {
        let out_dir = TempDir::new().unwrap();
        let files = vec![SelectedFile::from_path("B.heic")];

        let mut out: Vec<u8> = Vec::new();
        let outcome = session(&out_dir, None).run(files, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(outcome.archive.is_none());
        assert_eq!(outcome.failed, 1);
        assert!(text.contains(crate::render::NOTHING_TO_ARCHIVE), "{text}");
        assert!(!out_dir.path().join("images.zip").exists());
    }

    #[test]
    fn unwritable_archive_is_reported_as_a_failure() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("not_a_dir");
        std::fs::write(&blocker, "x").unwrap();
        let files = vec![SelectedFile::from_path("A.heic")];

        let mut out: Vec<u8> = Vec::new();
        let outcome = session_writing_to(blocker.clone(), None)
            .run(files, &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(outcome.converted, 1);
        assert!(outcome.archive.is_none());
        assert!(text.contains("Could not write the archive"), "{text}");
        assert!(!text.contains("Saved"), "{text}");
        assert_eq!(std::fs::read(&blocker).unwrap(), b"x");
    }

    #[test]
    fn previews_are_written_when_requested() {
        let out_dir = TempDir::new().unwrap();
        let preview_dir = TempDir::new().unwrap();
        let files = vec![SelectedFile::from_path("photos/IMG_0001.HEIC")];

        let mut out: Vec<u8> = Vec::new();
        let outcome = session(&out_dir, Some(&preview_dir))
            .run(files, &mut out)
            .unwrap();

        assert!(outcome.archive.is_some());
        let preview = preview_dir.path().join("IMG_0001-1.preview.jpeg");
        assert_eq!(std::fs::read(preview).unwrap(), vec![0xFF, 0xD8, 0xFF, 0xD9]);
    }

    fn zip_reader(path: &std::path::Path) -> zip::ZipArchive<File> {
        zip::ZipArchive::new(File::open(path).unwrap()).unwrap()
    }
}
