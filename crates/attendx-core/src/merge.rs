//! Merge-key indexing and restore classification.
//!
//! Records are matched across a snapshot and a store by
//! `(ep_no, company_name, date)`. The store itself only enforces
//! `(ep_no, date)`, so a backup record can miss on the merge key yet still
//! collide with a store row filed under another company. Those are kept in
//! their own class instead of being treated as additions.

use crate::conflict::{detect_conflict, diff_records, FieldChange};
use crate::errors::SyncError;
use crate::snapshot::RecordEntry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identity of a record across snapshot and store
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MergeKey {
    pub ep_no: String,
    pub company_name: String,
    pub date: String,
}

impl MergeKey {
    pub fn new(
        ep_no: impl Into<String>,
        company_name: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            ep_no: ep_no.into(),
            company_name: company_name.into(),
            date: date.into(),
        }
    }

    pub fn of(entry: &RecordEntry) -> Self {
        Self::new(&entry.ep_no, &entry.company_name, &entry.date)
    }
}

impl std::fmt::Display for MergeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.ep_no, self.company_name, self.date)
    }
}

/// A store-side record as seen by the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedRecord {
    /// Store row id; `None` for a record staged earlier in the same preview
    pub id: Option<i64>,
    pub entry: RecordEntry,
}

/// A backup record and the store record it disagrees with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictPair {
    pub key: MergeKey,
    #[serde(skip)]
    pub store_id: Option<i64>,
    pub backup: RecordEntry,
    pub store: RecordEntry,
    pub changes: Vec<FieldChange>,
}

/// A backup record whose employee-day is filed under another company
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyMismatch {
    pub key: MergeKey,
    pub store_company: String,
}

impl CompanyMismatch {
    pub fn to_error(&self) -> SyncError {
        SyncError::CompanyMismatch {
            ep_no: self.key.ep_no.clone(),
            date: self.key.date.clone(),
            backup_company: self.key.company_name.clone(),
            store_company: self.store_company.clone(),
        }
    }
}

/// How one backup record relates to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Add,
    Update(ConflictPair),
    Skip,
    CompanyMismatch(CompanyMismatch),
}

/// Store records indexed by merge key and by employee-day
#[derive(Debug, Default)]
pub struct StoreIndex {
    by_key: HashMap<MergeKey, IndexedRecord>,
    company_by_employee_day: HashMap<(String, String), String>,
}

impl StoreIndex {
    /// Index store rows given as `(row id, entry)`
    pub fn build<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (i64, RecordEntry)>,
    {
        let mut index = Self::default();
        for (id, entry) in rows {
            index.register(Some(id), entry);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn get(&self, key: &MergeKey) -> Option<&IndexedRecord> {
        self.by_key.get(key)
    }

    /// Record the current store-side state of a key.
    ///
    /// Called after each add or update so that a later record with the same
    /// key in the same snapshot is compared against what was just written.
    pub fn register(&mut self, id: Option<i64>, entry: RecordEntry) {
        let key = MergeKey::of(&entry);
        self.company_by_employee_day
            .insert((key.ep_no.clone(), key.date.clone()), key.company_name.clone());

        let id = id.or_else(|| self.by_key.get(&key).and_then(|r| r.id));
        self.by_key.insert(key, IndexedRecord { id, entry });
    }

    /// Classify a backup record against the indexed store state.
    ///
    /// The backup entry is canonicalized before keying, and its checksum is
    /// recomputed from its fields. A loosely formatted date or time matches
    /// the stored row, and an embedded checksum that went stale after a hand
    /// edit still registers the change.
    pub fn classify(&self, backup: &RecordEntry) -> Classification {
        let backup = backup.clone().canonicalize().with_checksum();
        let key = MergeKey::of(&backup);

        if let Some(stored) = self.by_key.get(&key) {
            if !detect_conflict(&backup, &stored.entry) {
                return Classification::Skip;
            }
            let changes = diff_records(&backup, &stored.entry);
            return Classification::Update(ConflictPair {
                key,
                store_id: stored.id,
                backup,
                store: stored.entry.clone(),
                changes,
            });
        }

        match self
            .company_by_employee_day
            .get(&(key.ep_no.clone(), key.date.clone()))
        {
            Some(store_company) => Classification::CompanyMismatch(CompanyMismatch {
                key,
                store_company: store_company.clone(),
            }),
            None => Classification::Add,
        }
    }
}

/// Counts for a restore preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PreviewSummary {
    pub add_count: usize,
    pub update_count: usize,
    pub skip_count: usize,
    pub conflict_count: usize,
    pub company_mismatch_count: usize,
}

/// Dry-run classification of a snapshot against a store
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RestorePreview {
    pub to_add: Vec<RecordEntry>,
    pub to_update: Vec<RecordEntry>,
    pub to_skip: Vec<RecordEntry>,
    pub conflicts: Vec<ConflictPair>,
    pub company_mismatches: Vec<CompanyMismatch>,
    pub summary: PreviewSummary,
}

/// Classify every backup record without touching the store.
///
/// `index` is consumed because staged additions and updates are registered
/// into it as the records are walked in order.
pub fn preview_changes(mut index: StoreIndex, records: &[RecordEntry]) -> RestorePreview {
    let mut preview = RestorePreview::default();

    for record in records {
        match index.classify(record) {
            Classification::Add => {
                preview.to_add.push(record.clone());
                index.register(None, record.clone().canonicalize().with_checksum());
            }
            Classification::Update(pair) => {
                preview.to_update.push(record.clone());
                index.register(pair.store_id, pair.backup.clone());
                preview.conflicts.push(pair);
            }
            Classification::Skip => preview.to_skip.push(record.clone()),
            Classification::CompanyMismatch(mismatch) => {
                preview.company_mismatches.push(mismatch)
            }
        }
    }

    preview.summary = PreviewSummary {
        add_count: preview.to_add.len(),
        update_count: preview.to_update.len(),
        skip_count: preview.to_skip.len(),
        conflict_count: preview.conflicts.len(),
        company_mismatch_count: preview.company_mismatches.len(),
    };
    preview
}
