//! AttendX Core - attendance snapshot and merge kernel
//!
//! This crate holds everything about backup and restore that does not touch a
//! database:
//! - Attendance and company models with typed status and shift times
//! - Content checksums over canonical field maps
//! - Snapshot wire format, builder and structural validator
//! - Conflict detection and merge-strategy resolution
//! - Merge-key indexing and restore preview classification

pub mod checksum;
pub mod conflict;
pub mod errors;
pub mod logging_facility;
pub mod merge;
pub mod model;
pub mod snapshot;

// Re-export commonly used types
pub use checksum::checksum_fields;
pub use conflict::{
    apply_merge_strategy, detect_conflict, diff_records, FieldChange, MergeOutcome,
    MergeStrategy, Side,
};
pub use errors::{ExError, ExErrorKind, Result, SyncError};
pub use merge::{preview_changes, Classification, MergeKey, RestorePreview, StoreIndex};
pub use model::{AttendanceFields, AttendanceRecord, AttendanceStatus, Company, ShiftTimes};
pub use snapshot::{
    build_snapshot, validate_snapshot, BackupType, RecordEntry, Snapshot, ValidationReport,
};
