//! Multi-file processing tests.

use std::path::Path;

use retime::{BatchOptions, RemuxStatus, RetimeError, process_all, process_file};

fn offset_path() -> &'static str {
    "tests/fixtures/offset.ts"
}

#[test]
fn source_without_extension_is_reported() {
    let report = process_file(Path::new("no_extension"), &BatchOptions::new());

    assert!(report.is_failure());
    assert!(report.destination.is_none());
    assert!(matches!(report.result, Err(RetimeError::MissingExtension { .. })));
    assert!(!report.source_removed);
}

#[test]
fn existing_output_is_not_overwritten() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let source = temporary_directory.path().join("clip.ts");
    let existing = temporary_directory.path().join("clip_convert.ts");
    std::fs::write(&source, b"source bytes").expect("Failed to write source");
    std::fs::write(&existing, b"keep me").expect("Failed to write existing output");

    let report = process_file(&source, &BatchOptions::new());

    assert!(matches!(report.result, Err(RetimeError::OutputExists { .. })));
    assert_eq!(report.destination.as_deref(), Some(existing.as_path()));
    assert_eq!(std::fs::read(&existing).expect("read output"), b"keep me");
    assert!(source.exists());
    assert!(!report.source_removed);
}

#[test]
fn empty_suffix_never_touches_the_source() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let source = temporary_directory.path().join("a.ts");
    std::fs::write(&source, b"only copy").expect("Failed to write source");
    let options = BatchOptions::new().with_suffix("").overwrite(true);

    let report = process_file(&source, &options);

    assert!(report.is_failure());
    assert!(matches!(report.result, Err(RetimeError::InvalidSuffix { .. })));
    assert!(report.destination.is_none());
    assert!(!report.source_removed);
    assert_eq!(std::fs::read(&source).expect("read source"), b"only copy");
}

#[test]
fn failed_remux_keeps_the_source_and_leaves_no_output() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let source = temporary_directory.path().join("garbage.mp4");
    std::fs::write(&source, b"this is not a media file").expect("Failed to write source");

    let report = process_file(&source, &BatchOptions::new());

    assert!(report.is_failure());
    assert!(matches!(report.status(), RemuxStatus::IoFailed(_)));
    assert!(source.exists());
    let destination = report.destination.expect("destination derived");
    assert!(!destination.exists());
}

#[test]
fn every_file_gets_a_report() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let missing = temporary_directory.path().join("missing.ts");

    let reports = process_all(
        [Path::new("no_extension"), missing.as_path()],
        &BatchOptions::new(),
    );

    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|report| report.is_failure()));
    assert_eq!(reports[1].source, missing);
}

fn copy_fixture(directory: &Path) -> Option<std::path::PathBuf> {
    if !Path::new(offset_path()).exists() {
        return None;
    }
    let source = directory.join("offset.ts");
    std::fs::copy(offset_path(), &source).expect("Failed to copy fixture");
    Some(source)
}

#[test]
fn completed_remux_removes_the_source() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let Some(source) = copy_fixture(temporary_directory.path()) else {
        return;
    };

    let report = process_file(&source, &BatchOptions::new());

    assert_eq!(report.status(), RemuxStatus::Completed);
    assert!(report.source_removed);
    assert!(!source.exists());
    assert!(temporary_directory.path().join("offset_convert.ts").exists());
}

#[test]
fn keep_source_and_custom_suffix() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let Some(source) = copy_fixture(temporary_directory.path()) else {
        return;
    };
    let options = BatchOptions::new().with_suffix("_zeroed").keep_source(true);

    let report = process_file(&source, &options);

    assert_eq!(report.status(), RemuxStatus::Completed);
    assert!(!report.source_removed);
    assert!(source.exists());
    assert!(temporary_directory.path().join("offset_zeroed.ts").exists());
}

#[cfg(feature = "rayon")]
#[test]
fn parallel_reports_follow_input_order() {
    let sources = ["first", "second.ts", "third"];

    let reports = retime::process_all_parallel(&sources, &BatchOptions::new());

    let names: Vec<_> = reports.iter().map(|report| report.source.clone()).collect();
    assert_eq!(names, vec![Path::new("first"), Path::new("second.ts"), Path::new("third")]);
}
