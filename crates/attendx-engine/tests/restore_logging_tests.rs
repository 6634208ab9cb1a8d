#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use attendx_core::conflict::MergeStrategy;
use attendx_core::logging_facility::init_test_capture;
use attendx_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use attendx_core_types::{RunContext, RunId};
use attendx_engine::{apply_restore, create_backup, BackupOptions, RestoreOptions};
use common::{at, seed_company, setup_store};
use serde_json::json;

#[test]
fn test_restore_emits_start_and_end_with_counts() {
    let capture = init_test_capture();
    let (_tmp, mut conn) = setup_store();
    seed_company(&conn, "Acme", 2, at(10, 18));
    let document = create_backup(&conn, &BackupOptions::full())
        .data
        .unwrap()
        .to_value()
        .unwrap();

    let run_id = RunId::from_string("run-restore-logging-1".to_string());
    let options = RestoreOptions::new(MergeStrategy::BackupWins)
        .with_context(RunContext::with_run_id(run_id.clone()));
    let report = apply_restore(&mut conn, &document, &options, None);
    assert_eq!(report.run_id, run_id.as_str());

    let ours = |event: &str| {
        capture
            .find("apply_restore", event)
            .into_iter()
            .filter(|e| e.field("run_id") == Some(run_id.as_str()))
            .collect::<Vec<_>>()
    };
    let starts = ours(EVENT_START);
    assert_eq!(starts.len(), 1);
    assert_eq!(starts[0].field("strategy"), Some("backup_wins"));

    let ends = ours(EVENT_END);
    assert_eq!(ends.len(), 1);
    assert_eq!(ends[0].field("skipped"), Some("2"));
}

#[test]
fn test_failed_restore_emits_error_code() {
    let capture = init_test_capture();
    let (_tmp, mut conn) = setup_store();

    let run_id = RunId::from_string("run-restore-logging-2".to_string());
    let options = RestoreOptions::new(MergeStrategy::BackupWins)
        .with_context(RunContext::with_run_id(run_id.clone()));
    let report = apply_restore(&mut conn, &json!({}), &options, None);
    assert!(!report.success);

    let errors: Vec<_> = capture
        .find("apply_restore", EVENT_END_ERROR)
        .into_iter()
        .filter(|e| e.field("run_id") == Some(run_id.as_str()))
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field("err_code"), Some("ERR_INVALID_SNAPSHOT"));
}

#[test]
fn test_backup_emits_lifecycle_events() {
    let capture = init_test_capture();
    let (_tmp, conn) = setup_store();
    seed_company(&conn, "Acme", 1, at(10, 18));

    let outcome = create_backup(&conn, &BackupOptions::full());
    assert!(outcome.success);

    capture.assert_event_exists("create_backup", EVENT_START);
    capture.assert_event_exists("create_backup", EVENT_END);
}
