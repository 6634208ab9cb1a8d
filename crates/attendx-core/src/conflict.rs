//! Conflict detection and merge-strategy resolution.
//!
//! A conflict is a backup-side and a store-side record that share a merge key
//! but differ in at least one business field. Timestamps, row ids and the
//! checksum itself never count as a difference, and `null` equals `""`.

use crate::errors::{Result, SyncError};
use crate::snapshot::RecordEntry;
use serde::{Deserialize, Serialize};

/// One business field whose value differs between the two sides
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: String,
    pub backup: Option<String>,
    pub store: Option<String>,
}

/// Field-by-field comparison over the business fields of both records
///
/// Changes are listed in wire order.
pub fn diff_records(backup: &RecordEntry, store: &RecordEntry) -> Vec<FieldChange> {
    backup
        .canonical_fields()
        .into_iter()
        .zip(store.canonical_fields())
        .filter_map(|((field, b), (_, s))| {
            let (b, s) = (normalize(b), normalize(s));
            (b != s).then(|| FieldChange {
                field: field.to_string(),
                backup: b.map(str::to_string),
                store: s.map(str::to_string),
            })
        })
        .collect()
}

/// Decide whether two same-key records differ.
///
/// When both carry a checksum the checksums are compared directly;
/// otherwise falls back to [`diff_records`].
pub fn detect_conflict(backup: &RecordEntry, store: &RecordEntry) -> bool {
    match (backup.checksum.as_deref(), store.checksum.as_deref()) {
        (Some(b), Some(s)) => b != s,
        _ => !diff_records(backup, store).is_empty(),
    }
}

fn normalize(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Policy for settling a conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Overwrite the store with the backup's values
    #[default]
    BackupWins,
    /// Keep the store's values
    DatabaseWins,
    /// Leave the conflict for an explicit per-record decision
    Manual,
}

impl MergeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::BackupWins => "backup_wins",
            MergeStrategy::DatabaseWins => "database_wins",
            MergeStrategy::Manual => "manual",
        }
    }
}

impl std::str::FromStr for MergeStrategy {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "backup_wins" => Ok(MergeStrategy::BackupWins),
            "database_wins" => Ok(MergeStrategy::DatabaseWins),
            "manual" => Ok(MergeStrategy::Manual),
            other => Err(SyncError::UnknownStrategy {
                strategy: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side an explicit decision keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Backup,
    Database,
}

/// Result of applying a strategy to one conflict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The record to persist
    Resolved(RecordEntry),
    /// No decision available; the store is left as it is
    Deferred,
}

/// Resolve one conflict under `strategy`.
///
/// `decision` is only consulted for [`MergeStrategy::Manual`].
pub fn apply_merge_strategy(
    backup: &RecordEntry,
    store: &RecordEntry,
    strategy: MergeStrategy,
    decision: Option<Side>,
) -> MergeOutcome {
    match (strategy, decision) {
        (MergeStrategy::BackupWins, _) | (MergeStrategy::Manual, Some(Side::Backup)) => {
            MergeOutcome::Resolved(backup.clone())
        }
        (MergeStrategy::DatabaseWins, _) | (MergeStrategy::Manual, Some(Side::Database)) => {
            MergeOutcome::Resolved(store.clone())
        }
        (MergeStrategy::Manual, None) => MergeOutcome::Deferred,
    }
}
