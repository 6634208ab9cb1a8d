//! SQLite repository implementation
//!
//! All functions take a `&Connection`; pass a `&Transaction` (it derefs) to
//! run them inside a restore transaction.

use crate::errors::{corrupt_row, from_rusqlite, Result};
use attendx_core::errors::{ExError, ExErrorKind};
use attendx_core::model::{
    format_time, parse_date, parse_time, AttendanceFields, AttendanceRecord, AttendanceStatus,
    Company, ShiftTimes, DATE_FORMAT,
};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{Connection, OptionalExtension, Row};

/// Optional restriction on which attendance records are listed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Only records with `updated_at >= updated_since` (inclusive)
    pub updated_since: Option<DateTime<Utc>>,
}

impl RecordFilter {
    pub fn updated_since(since: DateTime<Utc>) -> Self {
        Self {
            updated_since: Some(since),
        }
    }
}

const RECORD_COLUMNS: &str = "r.id, r.ep_no, r.ep_name, r.company_id, c.name, r.date, r.shift,
    r.overstay, r.status, r.in_time, r.out_time, r.in_time_2, r.out_time_2, r.in_time_3,
    r.out_time_3, r.overtime, r.overtime_to_mandays, r.created_at, r.updated_at";

/// Attendance row as stored, before parsing
struct RawRecord {
    id: i64,
    ep_no: String,
    ep_name: String,
    company_id: i64,
    company_name: String,
    date: String,
    shift: String,
    overstay: String,
    status: String,
    times: [Option<String>; 8],
    created_at: i64,
    updated_at: i64,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            ep_no: row.get(1)?,
            ep_name: row.get(2)?,
            company_id: row.get(3)?,
            company_name: row.get(4)?,
            date: row.get(5)?,
            shift: row.get(6)?,
            overstay: row.get(7)?,
            status: row.get(8)?,
            times: [
                row.get(9)?,
                row.get(10)?,
                row.get(11)?,
                row.get(12)?,
                row.get(13)?,
                row.get(14)?,
                row.get(15)?,
                row.get(16)?,
            ],
            created_at: row.get(17)?,
            updated_at: row.get(18)?,
        })
    }

    fn decode(self) -> Result<AttendanceRecord> {
        let id = self.id;
        let corrupt = |e: attendx_core::SyncError| corrupt_row("attendance_records", id, e.to_string());
        let [in_time, out_time, in_time_2, out_time_2, in_time_3, out_time_3, overtime, overtime_to_mandays] =
            self.times;

        Ok(AttendanceRecord {
            id,
            ep_no: self.ep_no,
            ep_name: self.ep_name,
            company_id: self.company_id,
            company_name: self.company_name,
            date: parse_date("date", &self.date).map_err(corrupt)?,
            shift: self.shift,
            overstay: self.overstay,
            status: AttendanceStatus::parse(&self.status).map_err(corrupt)?,
            times: ShiftTimes {
                in_time: parse_time("in_time", in_time.as_deref()).map_err(corrupt)?,
                out_time: parse_time("out_time", out_time.as_deref()).map_err(corrupt)?,
                in_time_2: parse_time("in_time_2", in_time_2.as_deref()).map_err(corrupt)?,
                out_time_2: parse_time("out_time_2", out_time_2.as_deref()).map_err(corrupt)?,
                in_time_3: parse_time("in_time_3", in_time_3.as_deref()).map_err(corrupt)?,
                out_time_3: parse_time("out_time_3", out_time_3.as_deref()).map_err(corrupt)?,
                overtime: parse_time("overtime", overtime.as_deref()).map_err(corrupt)?,
                overtime_to_mandays: parse_time(
                    "overtime_to_mandays",
                    overtime_to_mandays.as_deref(),
                )
                .map_err(corrupt)?,
            },
            created_at: millis_to_utc("attendance_records", id, self.created_at)?,
            updated_at: millis_to_utc("attendance_records", id, self.updated_at)?,
        })
    }
}

fn millis_to_utc(table: &str, id: i64, millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| corrupt_row(table, id, format!("timestamp out of range: {}", millis)))
}

fn company_from_row(row: &Row<'_>) -> rusqlite::Result<(i64, String, i64)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn decode_company((id, name, created_at): (i64, String, i64)) -> Result<Company> {
    Ok(Company::new(
        id,
        name,
        millis_to_utc("companies", id, created_at)?,
    ))
}

/// SQLite repository for companies and attendance records
pub struct SqliteRepo;

impl SqliteRepo {
    /// All companies, ordered by name
    pub fn list_companies(conn: &Connection) -> Result<Vec<Company>> {
        let mut stmt = conn
            .prepare("SELECT id, name, created_at FROM companies ORDER BY name")
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([], company_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        rows.into_iter().map(decode_company).collect()
    }

    /// Look up a company by its exact name
    pub fn get_company_by_name(conn: &Connection, name: &str) -> Result<Option<Company>> {
        let row = conn
            .query_row(
                "SELECT id, name, created_at FROM companies WHERE name = ?1",
                [name],
                company_from_row,
            )
            .optional()
            .map_err(from_rusqlite)?;

        row.map(decode_company).transpose()
    }

    /// Create a company
    ///
    /// # Errors
    ///
    /// Returns a `ConstraintViolation` if the name is already taken.
    pub fn create_company(conn: &Connection, name: &str, at: DateTime<Utc>) -> Result<Company> {
        if name.trim().is_empty() {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("create_company")
                .with_message("Company name must not be empty"));
        }

        conn.execute(
            "INSERT INTO companies (name, created_at) VALUES (?1, ?2)",
            rusqlite::params![name, at.timestamp_millis()],
        )
        .map_err(from_rusqlite)?;

        Ok(Company::new(conn.last_insert_rowid(), name, at))
    }

    /// List attendance records in insertion order
    pub fn list_attendance_records(
        conn: &Connection,
        filter: &RecordFilter,
    ) -> Result<Vec<AttendanceRecord>> {
        let sql = format!(
            "SELECT {} FROM attendance_records r
             JOIN companies c ON c.id = r.company_id
             WHERE ?1 IS NULL OR r.updated_at >= ?1
             ORDER BY r.id",
            RECORD_COLUMNS
        );
        let since = filter.updated_since.map(|s| s.timestamp_millis());

        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([since], RawRecord::from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        rows.into_iter().map(RawRecord::decode).collect()
    }

    /// Insert an attendance record and return its row id
    ///
    /// # Errors
    ///
    /// Returns a `ConstraintViolation` if the employee already has a record
    /// on that date, or the company does not exist.
    pub fn insert_attendance_record(
        conn: &Connection,
        company_id: i64,
        fields: &AttendanceFields,
        at: DateTime<Utc>,
    ) -> Result<i64> {
        let t = &fields.times;
        conn.execute(
            "INSERT INTO attendance_records (
                ep_no, ep_name, company_id, date, shift, overstay, status,
                in_time, out_time, in_time_2, out_time_2, in_time_3, out_time_3,
                overtime, overtime_to_mandays, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16)",
            rusqlite::params![
                fields.ep_no,
                fields.ep_name,
                company_id,
                fields.date.format(DATE_FORMAT).to_string(),
                fields.shift,
                fields.overstay,
                fields.status.code(),
                format_time(t.in_time),
                format_time(t.out_time),
                format_time(t.in_time_2),
                format_time(t.out_time_2),
                format_time(t.in_time_3),
                format_time(t.out_time_3),
                format_time(t.overtime),
                format_time(t.overtime_to_mandays),
                at.timestamp_millis(),
            ],
        )
        .map_err(from_rusqlite)?;

        Ok(conn.last_insert_rowid())
    }

    /// Overwrite the mutable fields of an existing attendance record
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no record has the given id.
    pub fn update_attendance_record(
        conn: &Connection,
        id: i64,
        company_id: i64,
        fields: &AttendanceFields,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let t = &fields.times;
        let changed = conn
            .execute(
                "UPDATE attendance_records SET
                    ep_no = ?2, ep_name = ?3, company_id = ?4, date = ?5, shift = ?6,
                    overstay = ?7, status = ?8, in_time = ?9, out_time = ?10,
                    in_time_2 = ?11, out_time_2 = ?12, in_time_3 = ?13, out_time_3 = ?14,
                    overtime = ?15, overtime_to_mandays = ?16, updated_at = ?17
                 WHERE id = ?1",
                rusqlite::params![
                    id,
                    fields.ep_no,
                    fields.ep_name,
                    company_id,
                    fields.date.format(DATE_FORMAT).to_string(),
                    fields.shift,
                    fields.overstay,
                    fields.status.code(),
                    format_time(t.in_time),
                    format_time(t.out_time),
                    format_time(t.in_time_2),
                    format_time(t.out_time_2),
                    format_time(t.in_time_3),
                    format_time(t.out_time_3),
                    format_time(t.overtime),
                    format_time(t.overtime_to_mandays),
                    at.timestamp_millis(),
                ],
            )
            .map_err(from_rusqlite)?;

        if changed == 0 {
            return Err(ExError::new(ExErrorKind::NotFound)
                .with_op("update_attendance_record")
                .with_entity_id(id.to_string())
                .with_message("Attendance record not found"));
        }
        Ok(())
    }

    pub fn count_companies(conn: &Connection) -> Result<usize> {
        count(conn, "SELECT COUNT(*) FROM companies")
    }

    pub fn count_attendance_records(conn: &Connection) -> Result<usize> {
        count(conn, "SELECT COUNT(*) FROM attendance_records")
    }
}

fn count(conn: &Connection, sql: &str) -> Result<usize> {
    let n: i64 = conn
        .query_row(sql, [], |row| row.get(0))
        .map_err(from_rusqlite)?;
    Ok(usize::try_from(n).unwrap_or_default())
}
