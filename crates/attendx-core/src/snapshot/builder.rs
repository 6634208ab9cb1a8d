use super::format::{
    BackupType, CompanyEntry, RecordEntry, Snapshot, SnapshotMetadata, SNAPSHOT_VERSION,
};
use crate::model::{AttendanceRecord, Company};
use chrono::{DateTime, Utc};

/// Serialize store rows into a snapshot.
///
/// The caller reads the rows (filtered by `updated_at >= since` for an
/// incremental snapshot); this function only shapes them. Totals in the
/// metadata are taken from the produced arrays, so they always agree.
pub fn build_snapshot(
    backup_type: BackupType,
    since: Option<DateTime<Utc>>,
    companies: &[Company],
    records: &[AttendanceRecord],
    created_at: DateTime<Utc>,
) -> Snapshot {
    let companies: Vec<CompanyEntry> = companies.iter().map(CompanyEntry::from_company).collect();
    let attendance_records: Vec<RecordEntry> =
        records.iter().map(RecordEntry::from_record).collect();

    let since_date = match backup_type {
        BackupType::Incremental => since.map(|s| s.to_rfc3339()),
        BackupType::Full => None,
    };

    Snapshot {
        metadata: SnapshotMetadata {
            version: SNAPSHOT_VERSION.to_string(),
            created_at: created_at.to_rfc3339(),
            backup_type,
            total_companies: companies.len(),
            total_attendance_records: attendance_records.len(),
            since_date,
        },
        companies,
        attendance_records,
    }
}
