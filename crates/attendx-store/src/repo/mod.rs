//! Repository layer for companies and attendance records

pub mod sqlite_repo;

pub use sqlite_repo::{RecordFilter, SqliteRepo};
