#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use attendx_core::conflict::{MergeStrategy, Side};
use attendx_core::merge::MergeKey;
use attendx_core::model::AttendanceStatus;
use attendx_engine::{
    apply_restore, create_backup, preview_restore, validate_backup, BackupOptions,
    RestoreOptions,
};
use attendx_store::{RecordFilter, SqliteRepo};
use common::{at, fields, seed_company, setup_store};
use serde_json::{json, Value};

fn full_backup(conn: &rusqlite::Connection) -> Value {
    create_backup(conn, &BackupOptions::full())
        .data
        .unwrap()
        .to_value()
        .unwrap()
}

fn restore(
    conn: &mut rusqlite::Connection,
    document: &Value,
    strategy: MergeStrategy,
) -> attendx_engine::RestoreReport {
    apply_restore(conn, document, &RestoreOptions::new(strategy), None)
}

fn set_all(document: &mut Value, field: &str, value: Value) {
    for record in document["attendance_records"].as_array_mut().unwrap() {
        record[field] = value.clone();
    }
}

fn statuses(conn: &rusqlite::Connection) -> Vec<AttendanceStatus> {
    SqliteRepo::list_attendance_records(conn, &RecordFilter::default())
        .unwrap()
        .into_iter()
        .map(|r| r.status)
        .collect()
}

#[test]
fn test_example_scenario_backup_wins() {
    let (_tmp, mut conn) = setup_store();
    let acme = SqliteRepo::create_company(&conn, "Acme", at(1, 0)).unwrap();
    SqliteRepo::insert_attendance_record(
        &conn,
        acme.id,
        &fields("E1", 10, AttendanceStatus::Present),
        at(10, 18),
    )
    .unwrap();

    let mut document = full_backup(&conn);
    assert_eq!(document["metadata"]["total_companies"], 1);
    assert_eq!(document["metadata"]["total_attendance_records"], 1);
    document["attendance_records"][0]["status"] = json!("A");

    let report = restore(&mut conn, &document, MergeStrategy::BackupWins);

    assert!(report.success, "{:?}", report.errors);
    assert_eq!((report.added, report.updated, report.skipped), (0, 1, 0));
    assert_eq!(statuses(&conn), vec![AttendanceStatus::Absent]);
}

#[test]
fn test_restoring_identical_snapshot_skips_everything() {
    let (_tmp, mut conn) = setup_store();
    seed_company(&conn, "Acme", 6, at(10, 18));
    let document = full_backup(&conn);

    let report = restore(&mut conn, &document, MergeStrategy::BackupWins);

    assert!(report.success);
    assert_eq!((report.added, report.updated, report.skipped), (0, 0, 6));
    assert_eq!(SqliteRepo::count_attendance_records(&conn).unwrap(), 6);
}

#[test]
fn test_second_restore_is_idempotent() {
    let (_tmp, source) = setup_store();
    seed_company(&source, "Acme", 4, at(10, 18));
    let mut document = full_backup(&source);
    document["attendance_records"][0]["status"] = json!("WO");

    let (_tmp2, mut target) = setup_store();
    seed_company(&target, "Acme", 2, at(9, 18));

    let first = restore(&mut target, &document, MergeStrategy::BackupWins);
    assert!(first.success);
    assert_eq!((first.added, first.updated, first.skipped), (2, 1, 1));

    let second = restore(&mut target, &document, MergeStrategy::BackupWins);
    assert!(second.success);
    assert_eq!(second.added, 0);
    assert_eq!(second.updated, 0);
    assert_eq!(second.skipped, first.added + first.updated + first.skipped);
    assert_eq!(SqliteRepo::count_attendance_records(&target).unwrap(), 4);
}

#[test]
fn test_unpadded_times_restore_idempotently() {
    let (_tmp, mut conn) = setup_store();
    seed_company(&conn, "Acme", 3, at(10, 18));
    let mut document = full_backup(&conn);
    set_all(&mut document, "in_time", json!("8:05"));

    let first = restore(&mut conn, &document, MergeStrategy::BackupWins);
    assert!(first.success, "{:?}", first.errors);
    assert_eq!((first.added, first.updated, first.skipped), (0, 3, 0));

    let second = restore(&mut conn, &document, MergeStrategy::BackupWins);
    assert!(second.success, "{:?}", second.errors);
    assert_eq!((second.added, second.updated, second.skipped), (0, 0, 3));

    let stored = SqliteRepo::list_attendance_records(&conn, &RecordFilter::default()).unwrap();
    assert!(stored
        .iter()
        .all(|r| r.times.in_time == chrono::NaiveTime::from_hms_opt(8, 5, 0)));
}

#[test]
fn test_unpadded_date_matches_existing_employee_day() {
    let (_tmp, mut conn) = setup_store();
    seed_company(&conn, "Acme", 2, at(10, 18));
    let mut document = full_backup(&conn);
    document["attendance_records"][0]["date"] = json!("2025-1-10");
    document["attendance_records"][1]["date"] = json!("2025-1-10");
    document["attendance_records"][1]["company_name"] = json!("Globex");

    let report = restore(&mut conn, &document, MergeStrategy::BackupWins);

    assert!(report.success, "{:?}", report.errors);
    assert_eq!((report.added, report.updated, report.skipped), (0, 0, 2));
    assert_eq!(report.company_mismatches.len(), 1);
    assert_eq!(report.company_mismatches[0].key.date, "2025-01-10");
    assert_eq!(report.company_mismatches[0].store_company, "Acme");
    assert_eq!(SqliteRepo::count_attendance_records(&conn).unwrap(), 2);
}

#[test]
fn test_new_company_is_created_and_records_inserted() {
    let (_tmp, source) = setup_store();
    seed_company(&source, "Globex", 5, at(10, 18));
    let document = full_backup(&source);

    let (_tmp2, mut target) = setup_store();
    seed_company(&target, "Acme", 1, at(10, 18));

    let report = restore(&mut target, &document, MergeStrategy::BackupWins);

    assert!(report.success);
    assert_eq!(report.added, 5);
    assert_eq!(report.companies_created, vec!["Globex"]);
    assert_eq!(SqliteRepo::count_companies(&target).unwrap(), 2);
    assert!(SqliteRepo::get_company_by_name(&target, "Globex").unwrap().is_some());
}

#[test]
fn test_company_referenced_only_by_records_is_created() {
    let (_tmp, source) = setup_store();
    seed_company(&source, "Globex", 2, at(10, 18));
    let mut document = full_backup(&source);
    document["companies"] = json!([]);
    document["metadata"]["total_companies"] = json!(0);

    let (_tmp2, mut target) = setup_store();
    let report = restore(&mut target, &document, MergeStrategy::BackupWins);

    assert!(report.success);
    assert_eq!(report.added, 2);
    assert_eq!(report.companies_created, vec!["Globex"]);
}

#[test]
fn test_every_record_changed_updates_all() {
    let (_tmp, mut conn) = setup_store();
    seed_company(&conn, "Acme", 7, at(10, 18));
    let mut document = full_backup(&conn);
    set_all(&mut document, "out_time", json!("20:00"));

    let report = restore(&mut conn, &document, MergeStrategy::BackupWins);

    assert_eq!((report.added, report.updated, report.skipped), (0, 7, 0));
    let records = SqliteRepo::list_attendance_records(&conn, &RecordFilter::default()).unwrap();
    assert!(records
        .iter()
        .all(|r| r.times.out_time == chrono::NaiveTime::from_hms_opt(20, 0, 0)));
}

#[test]
fn test_summary_accounts_for_every_record() {
    let (_tmp, source) = setup_store();
    seed_company(&source, "Acme", 10, at(10, 18));
    let mut document = full_backup(&source);
    for i in [1, 4, 7] {
        document["attendance_records"][i]["shift"] = json!("N");
    }

    let (_tmp2, mut target) = setup_store();
    seed_company(&target, "Acme", 8, at(10, 18));

    let report = restore(&mut target, &document, MergeStrategy::BackupWins);

    assert!(report.success);
    assert_eq!(report.total(), 10);
    assert_eq!((report.added, report.updated, report.skipped), (2, 3, 5));
}

#[test]
fn test_round_trip_into_empty_store() {
    let (_tmp, source) = setup_store();
    seed_company(&source, "Acme", 3, at(10, 18));
    seed_company(&source, "Globex", 2, at(10, 18));
    let acme = SqliteRepo::get_company_by_name(&source, "Acme").unwrap().unwrap();
    let mut odd = fields("A-9", 11, AttendanceStatus::HalfDay);
    odd.overstay = "1:15".to_string();
    odd.times.overtime_to_mandays = chrono::NaiveTime::from_hms_opt(2, 0, 0);
    SqliteRepo::insert_attendance_record(&source, acme.id, &odd, at(11, 18)).unwrap();
    let document = full_backup(&source);

    let (_tmp2, mut target) = setup_store();
    let report = restore(&mut target, &document, MergeStrategy::BackupWins);
    assert!(report.success);
    assert_eq!(report.added, 6);

    let business = |conn: &rusqlite::Connection| {
        let mut rows: Vec<_> = SqliteRepo::list_attendance_records(conn, &RecordFilter::default())
            .unwrap()
            .into_iter()
            .map(|r| (r.company_name.clone(), r.fields()))
            .collect();
        rows.sort_by(|a, b| (&a.1.ep_no, a.1.date).cmp(&(&b.1.ep_no, b.1.date)));
        rows
    };
    assert_eq!(business(&source), business(&target));
}

#[test]
fn test_database_wins_keeps_store_values() {
    let (_tmp, mut conn) = setup_store();
    seed_company(&conn, "Acme", 2, at(10, 18));
    let mut document = full_backup(&conn);
    set_all(&mut document, "status", json!("A"));

    let report = restore(&mut conn, &document, MergeStrategy::DatabaseWins);

    assert!(report.success);
    assert_eq!(report.updated, 2);
    assert_eq!(
        statuses(&conn),
        vec![AttendanceStatus::Present, AttendanceStatus::Present]
    );
}

#[test]
fn test_manual_defers_undecided_conflicts() {
    let (_tmp, mut conn) = setup_store();
    seed_company(&conn, "Acme", 3, at(10, 18));
    let mut document = full_backup(&conn);
    set_all(&mut document, "status", json!("PH"));

    let decided = MergeKey::new("A-2", "Acme", "2025-01-10");
    let options = RestoreOptions::new(MergeStrategy::Manual).with_decision(decided, Side::Backup);
    let report = apply_restore(&mut conn, &document, &options, None);

    assert!(report.success);
    assert_eq!((report.added, report.updated, report.skipped), (0, 1, 2));
    assert_eq!(report.deferred.len(), 2);
    assert!(report.deferred.iter().all(|c| c.changes[0].field == "status"));
    assert_eq!(
        statuses(&conn),
        vec![
            AttendanceStatus::Present,
            AttendanceStatus::PublicHoliday,
            AttendanceStatus::Present
        ]
    );
}

#[test]
fn test_company_mismatch_is_skipped_and_reported() {
    let (_tmp, mut conn) = setup_store();
    seed_company(&conn, "Acme", 1, at(10, 18));
    let mut document = full_backup(&conn);
    document["attendance_records"][0]["company_name"] = json!("Globex");

    let preview = preview_restore(&conn, &document).unwrap();
    assert_eq!(preview.summary.company_mismatch_count, 1);
    assert_eq!(preview.summary.add_count, 0);

    let report = restore(&mut conn, &document, MergeStrategy::BackupWins);

    assert!(report.success);
    assert_eq!((report.added, report.updated, report.skipped), (0, 0, 1));
    assert_eq!(report.company_mismatches.len(), 1);
    assert_eq!(report.company_mismatches[0].store_company, "Acme");
    assert!(report.warnings.iter().any(|w| w.contains("belongs to Acme")));
    assert_eq!(SqliteRepo::count_attendance_records(&conn).unwrap(), 1);
}

#[test]
fn test_bad_record_rolls_back_everything() {
    let (_tmp, source) = setup_store();
    seed_company(&source, "Globex", 5, at(10, 18));
    let mut document = full_backup(&source);
    document["attendance_records"][3]["status"] = json!("ZZ");

    let (_tmp2, mut target) = setup_store();
    let report = restore(&mut target, &document, MergeStrategy::BackupWins);

    assert!(!report.success);
    assert_eq!((report.added, report.updated, report.skipped), (0, 0, 0));
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("Error processing record 3:"));
    assert_eq!(SqliteRepo::count_attendance_records(&target).unwrap(), 0);
    assert_eq!(SqliteRepo::count_companies(&target).unwrap(), 0);
}

#[test]
fn test_invalid_snapshot_rejected_before_writes() {
    let (_tmp, mut conn) = setup_store();
    let document = json!({ "metadata": {}, "companies": [] });

    let validation = validate_backup(&document);
    assert!(!validation.valid);

    let report = restore(&mut conn, &document, MergeStrategy::BackupWins);
    assert!(!report.success);
    assert_eq!(report.errors, vec!["Missing required field: attendance_records"]);
    assert!(preview_restore(&conn, &document).is_err());
}

#[test]
fn test_progress_reported_at_interval_and_completion() {
    let (_tmp, source) = setup_store();
    seed_company(&source, "Acme", 25, at(10, 18));
    let document = full_backup(&source);

    let (_tmp2, mut target) = setup_store();
    let mut calls = Vec::new();
    let mut on_progress = |done: usize, total: usize| calls.push((done, total));
    let callback: &mut dyn FnMut(usize, usize) = &mut on_progress;
    let options = RestoreOptions::new(MergeStrategy::BackupWins).with_progress_interval(10);

    let report = apply_restore(&mut target, &document, &options, Some(callback));

    assert!(report.success);
    assert_eq!(calls, vec![(10, 25), (20, 25), (25, 25)]);
}

#[test]
fn test_preview_does_not_write() {
    let (_tmp, source) = setup_store();
    seed_company(&source, "Acme", 3, at(10, 18));
    let mut document = full_backup(&source);
    document["attendance_records"][0]["ep_name"] = json!("Renamed");

    let (_tmp2, target) = setup_store();
    seed_company(&target, "Acme", 2, at(10, 18));

    let preview = preview_restore(&target, &document).unwrap();

    assert_eq!(preview.summary.add_count, 1);
    assert_eq!(preview.summary.update_count, 1);
    assert_eq!(preview.summary.skip_count, 1);
    assert_eq!(preview.conflicts[0].changes[0].field, "ep_name");
    assert_eq!(SqliteRepo::count_attendance_records(&target).unwrap(), 2);
}
