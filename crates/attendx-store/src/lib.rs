//! AttendX Store - SQLite persistence for companies and attendance
//!
//! Provides:
//! - Connection setup (foreign keys, WAL)
//! - Embedded, checksummed schema migrations
//! - Repository functions used by backup and restore

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

// Re-export key types
pub use db::{open_store, open_store_in_memory};
pub use errors::Result;
pub use repo::{RecordFilter, SqliteRepo};
