//! Snapshot document schema.
//!
//! ```text
//! {
//!   "metadata": { "version", "created_at", "backup_type",
//!                 "total_companies", "total_attendance_records", "since_date"? },
//!   "companies": [ { "name", "created_at", "checksum" } ],
//!   "attendance_records": [ { "ep_no", "ep_name", "company_name", "date", ...,
//!                             "created_at", "updated_at", "checksum" } ]
//! }
//! ```
//!
//! Dates are `YYYY-MM-DD`, times `HH:MM` or `null`, timestamps RFC 3339.

use crate::checksum::{checksum_fields, is_well_formed};
use crate::errors::{Result, SyncError};
use crate::model::{
    format_time, parse_date, parse_time, AttendanceFields, AttendanceRecord, AttendanceStatus,
    Company, ShiftTimes, DATE_FORMAT,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Whether a snapshot holds every record or only recently modified ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupType {
    Full,
    Incremental,
}

impl BackupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackupType::Full => "full",
            BackupType::Incremental => "incremental",
        }
    }
}

impl std::str::FromStr for BackupType {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "full" => Ok(BackupType::Full),
            "incremental" => Ok(BackupType::Incremental),
            other => Err(SyncError::UnknownBackupType {
                value: other.to_string(),
            }),
        }
    }
}

/// Snapshot header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// Format version (currently "1.0")
    pub version: String,

    /// RFC 3339 timestamp of snapshot creation
    pub created_at: String,

    pub backup_type: BackupType,

    pub total_companies: usize,

    pub total_attendance_records: usize,

    /// Lower bound on `updated_at` used for an incremental snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since_date: Option<String>,
}

/// Company as written to a snapshot (no store id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyEntry {
    pub name: String,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub checksum: Option<String>,
}

impl CompanyEntry {
    pub fn from_company(company: &Company) -> Self {
        Self {
            name: company.name.clone(),
            created_at: Some(company.created_at.to_rfc3339()),
            checksum: Some(checksum_fields([("name", Some(company.name.as_str()))])),
        }
    }
}

/// Attendance record as written to a snapshot
///
/// `date` and `status` stay strings on the wire so that one malformed record
/// is reported against its index instead of failing the whole decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub ep_no: String,
    pub ep_name: String,
    pub company_name: String,
    pub date: String,
    #[serde(default)]
    pub shift: String,
    #[serde(default)]
    pub overstay: String,
    pub status: String,
    #[serde(default)]
    pub in_time: Option<String>,
    #[serde(default)]
    pub out_time: Option<String>,
    #[serde(default)]
    pub in_time_2: Option<String>,
    #[serde(default)]
    pub out_time_2: Option<String>,
    #[serde(default)]
    pub in_time_3: Option<String>,
    #[serde(default)]
    pub out_time_3: Option<String>,
    #[serde(default)]
    pub overtime: Option<String>,
    #[serde(default)]
    pub overtime_to_mandays: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub checksum: Option<String>,
}

impl RecordEntry {
    /// Serialize a store record, attaching its checksum
    pub fn from_record(record: &AttendanceRecord) -> Self {
        let times = &record.times;
        Self {
            ep_no: record.ep_no.clone(),
            ep_name: record.ep_name.clone(),
            company_name: record.company_name.clone(),
            date: record.date.format(DATE_FORMAT).to_string(),
            shift: record.shift.clone(),
            overstay: record.overstay.clone(),
            status: record.status.code().to_string(),
            in_time: format_time(times.in_time),
            out_time: format_time(times.out_time),
            in_time_2: format_time(times.in_time_2),
            out_time_2: format_time(times.out_time_2),
            in_time_3: format_time(times.in_time_3),
            out_time_3: format_time(times.out_time_3),
            overtime: format_time(times.overtime),
            overtime_to_mandays: format_time(times.overtime_to_mandays),
            created_at: Some(record.created_at.to_rfc3339()),
            updated_at: Some(record.updated_at.to_rfc3339()),
            checksum: None,
        }
        .with_checksum()
    }

    /// Business fields in canonical order, as compared and hashed
    pub fn canonical_fields(&self) -> [(&'static str, Option<&str>); 15] {
        [
            ("ep_no", Some(self.ep_no.as_str())),
            ("ep_name", Some(self.ep_name.as_str())),
            ("company_name", Some(self.company_name.as_str())),
            ("date", Some(self.date.as_str())),
            ("shift", Some(self.shift.as_str())),
            ("overstay", Some(self.overstay.as_str())),
            ("status", Some(self.status.as_str())),
            ("in_time", self.in_time.as_deref()),
            ("out_time", self.out_time.as_deref()),
            ("in_time_2", self.in_time_2.as_deref()),
            ("out_time_2", self.out_time_2.as_deref()),
            ("in_time_3", self.in_time_3.as_deref()),
            ("out_time_3", self.out_time_3.as_deref()),
            ("overtime", self.overtime.as_deref()),
            ("overtime_to_mandays", self.overtime_to_mandays.as_deref()),
        ]
    }

    /// Checksum over the current field values (ignores the stored one)
    pub fn compute_checksum(&self) -> String {
        checksum_fields(self.canonical_fields())
    }

    /// Replace the stored checksum with one computed from the fields
    pub fn with_checksum(mut self) -> Self {
        self.checksum = Some(self.compute_checksum());
        self
    }

    /// True when the stored checksum is present and matches the fields
    pub fn checksum_is_current(&self) -> bool {
        self.checksum
            .as_deref()
            .is_some_and(|c| is_well_formed(c) && c == self.compute_checksum())
    }

    /// Rewrite date, status and times in the form the store writes them
    ///
    /// `"2025-1-10"` becomes `"2025-01-10"` and `"9:00"` becomes `"09:00"`,
    /// so the entry keys and hashes like the row a restore would produce.
    /// An entry that does not parse is returned unchanged.
    pub fn canonicalize(self) -> Self {
        let Ok(fields) = self.to_fields() else {
            return self;
        };
        let times = &fields.times;
        Self {
            date: fields.date.format(DATE_FORMAT).to_string(),
            status: fields.status.code().to_string(),
            in_time: format_time(times.in_time),
            out_time: format_time(times.out_time),
            in_time_2: format_time(times.in_time_2),
            out_time_2: format_time(times.out_time_2),
            in_time_3: format_time(times.in_time_3),
            out_time_3: format_time(times.out_time_3),
            overtime: format_time(times.overtime),
            overtime_to_mandays: format_time(times.overtime_to_mandays),
            ..self
        }
    }

    /// Parse the wire values into a store field set
    ///
    /// # Errors
    ///
    /// Returns `SyncError::MissingCompanyName` for a record with no company,
    /// otherwise the first malformed date, status or time found.
    pub fn to_fields(&self) -> Result<AttendanceFields> {
        if self.company_name.trim().is_empty() {
            return Err(SyncError::MissingCompanyName {
                ep_no: self.ep_no.clone(),
            });
        }

        Ok(AttendanceFields {
            ep_no: self.ep_no.clone(),
            ep_name: self.ep_name.clone(),
            date: parse_date("date", &self.date)?,
            shift: self.shift.clone(),
            overstay: self.overstay.clone(),
            status: AttendanceStatus::parse(&self.status)?,
            times: ShiftTimes {
                in_time: parse_time("in_time", self.in_time.as_deref())?,
                out_time: parse_time("out_time", self.out_time.as_deref())?,
                in_time_2: parse_time("in_time_2", self.in_time_2.as_deref())?,
                out_time_2: parse_time("out_time_2", self.out_time_2.as_deref())?,
                in_time_3: parse_time("in_time_3", self.in_time_3.as_deref())?,
                out_time_3: parse_time("out_time_3", self.out_time_3.as_deref())?,
                overtime: parse_time("overtime", self.overtime.as_deref())?,
                overtime_to_mandays: parse_time(
                    "overtime_to_mandays",
                    self.overtime_to_mandays.as_deref(),
                )?,
            },
        })
    }
}

/// A complete snapshot document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub metadata: SnapshotMetadata,
    pub companies: Vec<CompanyEntry>,
    pub attendance_records: Vec<RecordEntry>,
}

impl Snapshot {
    /// Decode a document that has already passed structural validation
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidSnapshot` when a field has the wrong type
    /// or a record outside the validated sample lacks a required field.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| SyncError::InvalidSnapshot {
            errors: vec![format!("Snapshot does not match the expected schema: {}", e)],
        })
    }

    /// Encode as an untyped document (the form validation works on)
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Write the snapshot as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Io` if the file cannot be written.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| SyncError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        tracing::debug!(
            path = %path.display(),
            records = self.attendance_records.len(),
            "Wrote snapshot file"
        );
        Ok(())
    }
}

/// Read a snapshot file as an untyped document, ready for validation
///
/// # Errors
///
/// Returns `SyncError::Io` if the file cannot be read and
/// `SyncError::InvalidSnapshot` if it is not JSON.
pub fn read_snapshot_document(path: &Path) -> Result<Value> {
    let bytes = std::fs::read(path).map_err(|e| SyncError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_slice(&bytes).map_err(|e| SyncError::InvalidSnapshot {
        errors: vec![format!("Invalid JSON file: {}", e)],
    })
}
