use attendx_core::model::{AttendanceFields, AttendanceStatus};
use attendx_store::{open_store, SqliteRepo};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use rusqlite::Connection;
use tempfile::TempDir;

/// Fresh migrated store in a temp directory
#[allow(dead_code)]
pub fn setup_store() -> (TempDir, Connection) {
    let temp_dir = TempDir::new().unwrap();
    let conn = open_store(temp_dir.path().join("store.db")).unwrap();
    (temp_dir, conn)
}

#[allow(dead_code)]
pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, day, hour, 0, 0).unwrap()
}

#[allow(dead_code)]
pub fn fields(ep_no: &str, day: u32, status: AttendanceStatus) -> AttendanceFields {
    let mut f = AttendanceFields::new(
        ep_no,
        format!("Employee {}", ep_no),
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
        status,
    );
    f.shift = "G".to_string();
    f.times.in_time = NaiveTime::from_hms_opt(9, 0, 0);
    f.times.out_time = NaiveTime::from_hms_opt(17, 30, 0);
    f
}

/// Insert `count` present records for one company, one employee per record,
/// all on 2025-01-10 and stamped at `stamp`
#[allow(dead_code)]
pub fn seed_company(
    conn: &Connection,
    company: &str,
    count: usize,
    stamp: DateTime<Utc>,
) -> i64 {
    let company = match SqliteRepo::get_company_by_name(conn, company).unwrap() {
        Some(c) => c,
        None => SqliteRepo::create_company(conn, company, stamp).unwrap(),
    };
    for n in 0..count {
        let ep_no = format!("{}-{}", &company.name[..1], n + 1);
        SqliteRepo::insert_attendance_record(
            conn,
            company.id,
            &fields(&ep_no, 10, AttendanceStatus::Present),
            stamp,
        )
        .unwrap();
    }
    company.id
}
