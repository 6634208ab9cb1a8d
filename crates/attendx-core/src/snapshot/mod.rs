//! Portable attendance snapshots.
//!
//! ## Responsibilities
//!
//! - Wire types for the snapshot document (`format`)
//! - Building a snapshot from store rows (`builder`)
//! - Structural validation of untyped inbound documents (`validator`)
//!
//! ## Non-Responsibilities
//!
//! - Reading the store (handled by `attendx-engine`)
//! - Merging a snapshot back into a store (handled by `crate::merge`)

pub mod builder;
pub mod format;
pub mod validator;

pub use builder::build_snapshot;
pub use format::{
    read_snapshot_document, BackupType, CompanyEntry, RecordEntry, Snapshot, SnapshotMetadata,
    SNAPSHOT_VERSION,
};
pub use validator::{validate_snapshot, ValidationReport, RECORD_SAMPLE_SIZE};
