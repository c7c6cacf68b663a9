use crate::{AppState, ArchiveOutcome, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesSelected(selected) => state
            .enqueue_files(selected)
            .into_iter()
            .map(|(file_id, file)| Effect::ConvertFile {
                file_id,
                name: file.name,
                source: file.source,
            })
            .collect(),
        Msg::ConversionSucceeded { file_id, image } => {
            state.apply_converted(file_id, image);
            Vec::new()
        }
        Msg::ConversionFailed { file_id } => {
            state.apply_failed(file_id);
            Vec::new()
        }
        Msg::DownloadClicked => match state.begin_archive() {
            Some(entries) => vec![Effect::BuildArchive { entries }],
            None => Vec::new(),
        },
        Msg::ArchiveFinished(outcome) => {
            match outcome {
                ArchiveOutcome::Saved(report) => state.finish_archive_saved(report),
                ArchiveOutcome::Failed { message } => state.finish_archive_failed(message),
            }
            Vec::new()
        }
        Msg::ShowErrorsClicked => {
            state.set_errors_visible(true);
            Vec::new()
        }
        Msg::HideErrorsClicked => {
            state.set_errors_visible(false);
            Vec::new()
        }
        Msg::ClearErrorsClicked => {
            state.clear_errors();
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}
