//! Backup creation.
//!
//! Reads companies and records inside one read transaction so that the
//! counts in the snapshot match a single point in time.

use attendx_core::errors::{ExError, SyncError};
use attendx_core::snapshot::{build_snapshot, BackupType, Snapshot, SnapshotMetadata};
use attendx_core::{log_op_end, log_op_error, log_op_start};
use attendx_core_types::RunContext;
use attendx_store::errors::{from_rusqlite, Result};
use attendx_store::{RecordFilter, SqliteRepo};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

/// Options for a backup run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupOptions {
    pub backup_type: BackupType,
    /// Inclusive lower bound on `updated_at`; required for incremental
    pub since: Option<DateTime<Utc>>,
}

impl BackupOptions {
    pub fn full() -> Self {
        Self {
            backup_type: BackupType::Full,
            since: None,
        }
    }

    pub fn incremental(since: DateTime<Utc>) -> Self {
        Self {
            backup_type: BackupType::Incremental,
            since: Some(since),
        }
    }
}

impl Default for BackupOptions {
    fn default() -> Self {
        Self::full()
    }
}

/// Result of a backup run. Failures never carry a partial snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct BackupOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Snapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub companies_count: usize,
    pub records_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SnapshotMetadata>,
}

impl BackupOutcome {
    fn succeeded(snapshot: Snapshot) -> Self {
        Self {
            success: true,
            companies_count: snapshot.companies.len(),
            records_count: snapshot.attendance_records.len(),
            metadata: Some(snapshot.metadata.clone()),
            data: Some(snapshot),
            error: None,
        }
    }

    fn failed(err: &ExError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(format!("Backup failed: {}", err.message())),
            companies_count: 0,
            records_count: 0,
            metadata: None,
        }
    }
}

/// Create a full or incremental snapshot of the store
///
/// Store errors are reported in the outcome with a generic message; the
/// driver text is only logged.
pub fn create_backup(conn: &Connection, options: &BackupOptions) -> BackupOutcome {
    let context = RunContext::new();
    log_op_start!(
        "create_backup",
        run_id = context.run_id.as_str(),
        backup_type = options.backup_type.as_str()
    );
    let start = std::time::Instant::now();

    match create_backup_impl(conn, options) {
        Ok(snapshot) => {
            log_op_end!(
                "create_backup",
                duration_ms = start.elapsed().as_millis() as u64,
                run_id = context.run_id.as_str(),
                companies = snapshot.companies.len() as u64,
                records = snapshot.attendance_records.len() as u64
            );
            BackupOutcome::succeeded(snapshot)
        }
        Err(err) => {
            log_op_error!(
                "create_backup",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                run_id = context.run_id.as_str()
            );
            BackupOutcome::failed(&err)
        }
    }
}

/// Shorthand for an incremental backup of records updated at or after `since`
pub fn create_incremental_backup(conn: &Connection, since: DateTime<Utc>) -> BackupOutcome {
    create_backup(conn, &BackupOptions::incremental(since))
}

fn create_backup_impl(conn: &Connection, options: &BackupOptions) -> Result<Snapshot> {
    let filter = match options.backup_type {
        BackupType::Full => RecordFilter::default(),
        BackupType::Incremental => {
            let since = options
                .since
                .ok_or_else(|| ExError::from(SyncError::MissingSinceDate))?;
            RecordFilter::updated_since(since)
        }
    };

    let tx = conn.unchecked_transaction().map_err(from_rusqlite)?;
    let companies = SqliteRepo::list_companies(&tx)?;
    let records = SqliteRepo::list_attendance_records(&tx, &filter)?;
    tx.commit().map_err(from_rusqlite)?;

    tracing::debug!(
        companies = companies.len(),
        records = records.len(),
        "Read store for backup"
    );

    Ok(build_snapshot(
        options.backup_type,
        filter.updated_since,
        &companies,
        &records,
        Utc::now(),
    ))
}
