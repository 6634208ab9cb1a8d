//! Store-side domain models

pub mod attendance;
pub mod company;

pub use attendance::{
    format_time, parse_date, parse_time, AttendanceFields, AttendanceRecord, AttendanceStatus,
    ShiftTimes, DATE_FORMAT, TIME_FORMAT,
};
pub use company::Company;
