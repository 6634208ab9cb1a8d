use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SyncError};

/// Wire format for dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire format for times of day
pub const TIME_FORMAT: &str = "%H:%M";

/// Attendance status codes as written by the attendance sheets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    /// P
    Present,
    /// A
    Absent,
    /// PH
    PublicHoliday,
    /// PD
    PartialDay,
    /// WO
    WeekOff,
    /// -0.5
    HalfDay,
    /// -1
    FullDayLeave,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 7] = [
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
        AttendanceStatus::PublicHoliday,
        AttendanceStatus::PartialDay,
        AttendanceStatus::WeekOff,
        AttendanceStatus::HalfDay,
        AttendanceStatus::FullDayLeave,
    ];

    /// Stable code used in the store and in snapshots
    pub fn code(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "P",
            AttendanceStatus::Absent => "A",
            AttendanceStatus::PublicHoliday => "PH",
            AttendanceStatus::PartialDay => "PD",
            AttendanceStatus::WeekOff => "WO",
            AttendanceStatus::HalfDay => "-0.5",
            AttendanceStatus::FullDayLeave => "-1",
        }
    }

    /// Parse a status code
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidStatus` for codes outside the known set.
    pub fn parse(code: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.code() == code.trim())
            .ok_or_else(|| SyncError::InvalidStatus {
                value: code.to_string(),
            })
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// The optional punch times of one attendance day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTimes {
    pub in_time: Option<NaiveTime>,
    pub out_time: Option<NaiveTime>,
    pub in_time_2: Option<NaiveTime>,
    pub out_time_2: Option<NaiveTime>,
    pub in_time_3: Option<NaiveTime>,
    pub out_time_3: Option<NaiveTime>,
    pub overtime: Option<NaiveTime>,
    pub overtime_to_mandays: Option<NaiveTime>,
}

/// Field set written when creating or overwriting an attendance record
///
/// `ep_no` and `date` form the store identity; the remaining fields are the
/// mutable part a restore may overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceFields {
    pub ep_no: String,
    pub ep_name: String,
    pub date: NaiveDate,
    pub shift: String,
    pub overstay: String,
    pub status: AttendanceStatus,
    pub times: ShiftTimes,
}

impl AttendanceFields {
    /// Minimal field set with no shift, overstay or punch times
    pub fn new(
        ep_no: impl Into<String>,
        ep_name: impl Into<String>,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Self {
        Self {
            ep_no: ep_no.into(),
            ep_name: ep_name.into(),
            date,
            shift: String::new(),
            overstay: String::new(),
            status,
            times: ShiftTimes::default(),
        }
    }
}

/// AttendanceRecord - one employee's attendance on one date
///
/// Store uniqueness is `(ep_no, date)`. `company_name` is loaded alongside
/// the row so that records can be serialized without a second lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub ep_no: String,
    pub ep_name: String,
    pub company_id: i64,
    pub company_name: String,
    pub date: NaiveDate,
    pub shift: String,
    pub overstay: String,
    pub status: AttendanceStatus,
    pub times: ShiftTimes,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttendanceRecord {
    /// The mutable field view of this record
    pub fn fields(&self) -> AttendanceFields {
        AttendanceFields {
            ep_no: self.ep_no.clone(),
            ep_name: self.ep_name.clone(),
            date: self.date,
            shift: self.shift.clone(),
            overstay: self.overstay.clone(),
            status: self.status,
            times: self.times.clone(),
        }
    }
}

/// Parse a `YYYY-MM-DD` date
///
/// # Errors
///
/// Returns `SyncError::InvalidDate` naming `field`.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| SyncError::InvalidDate {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Parse an optional `HH:MM` time; `None` and `""` both mean no value
///
/// # Errors
///
/// Returns `SyncError::InvalidTime` naming `field`.
pub fn parse_time(field: &str, value: Option<&str>) -> Result<Option<NaiveTime>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => NaiveTime::parse_from_str(v, TIME_FORMAT)
            .map(Some)
            .map_err(|_| SyncError::InvalidTime {
                field: field.to_string(),
                value: v.to_string(),
            }),
    }
}

/// Format an optional time as `HH:MM`
pub fn format_time(value: Option<NaiveTime>) -> Option<String> {
    value.map(|t| t.format(TIME_FORMAT).to_string())
}
