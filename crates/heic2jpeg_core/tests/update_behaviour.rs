use std::sync::{Arc, Once};

use heic2jpeg_core::{
    update, AppState, ConvertedImage, Effect, FileId, FileSource, FileStatus, Msg, Preview,
    SelectedFile, StatusLine,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn converted(width: u32, height: u32) -> ConvertedImage {
    ConvertedImage {
        jpeg: Arc::from(&[0xFF_u8, 0xD8, 0xFF, 0xD9][..]),
        width,
        height,
        preview: Preview {
            width: width / 10,
            height: height / 10,
            jpeg: Arc::from(&[0xFF_u8, 0xD8][..]),
        },
    }
}

fn select(state: AppState, names: &[&str]) -> (AppState, Vec<Effect>) {
    let files = names
        .iter()
        .map(|name| SelectedFile::from_bytes(*name, name.as_bytes().to_vec()))
        .collect();
    update(state, Msg::FilesSelected(files))
}

fn converted_ids(effects: &[Effect]) -> Vec<FileId> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::ConvertFile { file_id, .. } => Some(*file_id),
            _ => None,
        })
        .collect()
}

#[test]
fn intake_appends_pending_placeholders_and_emits_conversions() {
    init_logging();
    let (mut state, effects) = select(AppState::new(), &["a.heic", "b.heic"]);

    assert_eq!(
        effects,
        vec![
            Effect::ConvertFile {
                file_id: 1,
                name: "a.heic".to_string(),
                source: FileSource::Bytes(Arc::from(&b"a.heic"[..])),
            },
            Effect::ConvertFile {
                file_id: 2,
                name: "b.heic".to_string(),
                source: FileSource::Bytes(Arc::from(&b"b.heic"[..])),
            },
        ]
    );

    let view = state.view();
    assert_eq!(view.file_count, 2);
    assert_eq!(view.pending_count, 2);
    assert_eq!(view.converted_count, 0);
    assert!(view.files.iter().all(|f| f.status == FileStatus::Pending));
    assert_eq!(view.status, StatusLine::Converting { remaining: 2 });
    assert!(!view.can_download);
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());
}

#[test]
fn ids_keep_growing_across_batches() {
    init_logging();
    let (state, first) = select(AppState::new(), &["a.heic"]);
    let (_state, second) = select(state, &["b.heic", "c.heic"]);

    assert_eq!(converted_ids(&first), vec![1]);
    assert_eq!(converted_ids(&second), vec![2, 3]);
}

#[test]
fn path_selection_is_named_after_file_name() {
    let file = SelectedFile::from_path("/photos/2024/IMG_0001.HEIC");
    assert_eq!(file.name, "IMG_0001.HEIC");
    assert_eq!(
        file.source,
        FileSource::Path("/photos/2024/IMG_0001.HEIC".into())
    );
}

#[test]
fn success_updates_entry_in_place() {
    init_logging();
    let (state, _) = select(AppState::new(), &["a.heic", "b.heic"]);

    let (mut state, effects) = update(
        state,
        Msg::ConversionSucceeded {
            file_id: 2,
            image: converted(4032, 3024),
        },
    );
    assert!(effects.is_empty());
    assert!(state.consume_dirty());

    let view = state.view();
    let names: Vec<_> = view.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.heic", "b.heic"]);
    assert_eq!(view.files[0].status, FileStatus::Pending);
    assert_eq!(view.files[1].status, FileStatus::Converted);
    assert_eq!(view.files[1].dimensions, Some((4032, 3024)));
    assert_eq!(view.files[1].preview_dimensions, Some((403, 302)));
    assert_eq!(view.status, StatusLine::Converting { remaining: 1 });
    assert!(state.file(2).and_then(|f| f.preview()).is_some());
    assert!(state.file(1).and_then(|f| f.preview()).is_none());
}

#[test]
fn failure_removes_entry_and_records_name() {
    init_logging();
    let (state, _) = select(AppState::new(), &["a.heic", "b.heic"]);

    let (mut state, effects) = update(state, Msg::ConversionFailed { file_id: 1 });
    assert!(effects.is_empty());
    assert!(state.consume_dirty());

    let view = state.view();
    assert_eq!(view.file_count, 1);
    assert_eq!(view.files[0].name, "b.heic");
    assert_eq!(view.errors, vec!["a.heic".to_string()]);
    assert_eq!(view.error_count, 1);
    assert!(state.file(1).is_none());
}

#[test]
fn three_files_with_middle_failure_end_in_two_converted_and_one_error() {
    init_logging();
    let (state, effects) = select(AppState::new(), &["A.heic", "B.heic", "C.heic"]);
    let ids = converted_ids(&effects);

    // Completion order is arbitrary.
    let (state, _) = update(
        state,
        Msg::ConversionSucceeded {
            file_id: ids[2],
            image: converted(10, 10),
        },
    );
    let (state, _) = update(state, Msg::ConversionFailed { file_id: ids[1] });
    let (state, _) = update(
        state,
        Msg::ConversionSucceeded {
            file_id: ids[0],
            image: converted(20, 20),
        },
    );

    let view = state.view();
    let names: Vec<_> = view.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["A.heic", "C.heic"]);
    assert!(view.files.iter().all(|f| f.status == FileStatus::Converted));
    assert_eq!(view.errors, vec!["B.heic".to_string()]);
    assert_eq!(view.converted_count + view.error_count, 3);
    assert_eq!(view.status, StatusLine::Converted { count: 2 });
    assert!(view.can_download);
}

#[test]
fn late_or_unknown_completions_are_ignored() {
    init_logging();
    let (state, _) = select(AppState::new(), &["a.heic"]);
    let (mut state, _) = update(
        state,
        Msg::ConversionSucceeded {
            file_id: 1,
            image: converted(8, 8),
        },
    );
    assert!(state.consume_dirty());
    let before = state.clone();

    // A second completion for an already-converted file must not flip it to failed.
    let (state, _) = update(state, Msg::ConversionFailed { file_id: 1 });
    let (mut state, _) = update(
        state,
        Msg::ConversionSucceeded {
            file_id: 99,
            image: converted(1, 1),
        },
    );
    assert_eq!(state, before);
    assert!(!state.consume_dirty());
}

#[test]
fn empty_session_never_enables_download() {
    init_logging();
    let state = AppState::new();
    assert!(!state.view().can_download);
    assert_eq!(state.view().status, StatusLine::Idle);

    let (state, effects) = update(state, Msg::DownloadClicked);
    assert!(effects.is_empty());
    let (state, _) = update(state, Msg::Tick);
    assert!(!state.view().can_download);
}

#[test]
fn all_failures_leave_nothing_to_download() {
    init_logging();
    let (state, _) = select(AppState::new(), &["x.heic", "y.heic"]);
    let (state, _) = update(state, Msg::ConversionFailed { file_id: 2 });
    let (state, _) = update(state, Msg::ConversionFailed { file_id: 1 });

    let view = state.view();
    assert_eq!(view.file_count, 0);
    assert_eq!(view.errors, vec!["y.heic".to_string(), "x.heic".to_string()]);
    assert!(!view.can_download);
    assert_eq!(view.status, StatusLine::Idle);
}
