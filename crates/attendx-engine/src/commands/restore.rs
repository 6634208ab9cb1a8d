//! Snapshot validation, restore preview and atomic restore.
//!
//! ## Restore pipeline (in order):
//! 1. Structural validation (hard stop, no writes)
//! 2. Typed decode of the document (hard stop, no writes)
//! 3. Open one transaction; load the company cache and the merge-key index
//! 4. Classify and apply each record in snapshot order
//! 5. Commit, then report final progress
//!
//! Any failure in steps 3-5 rolls the whole restore back. The report then
//! carries zero counts and a single error naming the record that failed.

use crate::company_cache::CompanyCache;
use attendx_core::conflict::{apply_merge_strategy, MergeOutcome, MergeStrategy, Side};
use attendx_core::errors::{ExError, ExErrorKind};
use attendx_core::merge::{
    preview_changes, Classification, CompanyMismatch, ConflictPair, MergeKey, RestorePreview,
    StoreIndex,
};
use attendx_core::snapshot::{validate_snapshot, RecordEntry, Snapshot, ValidationReport};
use attendx_core::{log_op_end, log_op_error, log_op_start};
use attendx_core_types::RunContext;
use attendx_store::errors::{from_rusqlite, Result};
use attendx_store::{RecordFilter, SqliteRepo};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Records between progress callbacks
pub const DEFAULT_PROGRESS_INTERVAL: usize = 100;

/// Options for a restore run
#[derive(Debug, Clone)]
pub struct RestoreOptions {
    pub strategy: MergeStrategy,
    /// Per-record decisions consulted by [`MergeStrategy::Manual`]
    pub decisions: BTreeMap<MergeKey, Side>,
    /// Call the progress callback every this many records (0 disables the
    /// periodic calls; the final call always happens)
    pub progress_interval: usize,
    pub context: RunContext,
}

impl RestoreOptions {
    pub fn new(strategy: MergeStrategy) -> Self {
        Self {
            strategy,
            decisions: BTreeMap::new(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            context: RunContext::new(),
        }
    }

    pub fn with_decision(mut self, key: MergeKey, side: Side) -> Self {
        self.decisions.insert(key, side);
        self
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn with_context(mut self, context: RunContext) -> Self {
        self.context = context;
        self
    }
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self::new(MergeStrategy::default())
    }
}

/// Outcome of a restore run
///
/// On success `added + updated + skipped` equals the number of records in
/// the snapshot. Deferred conflicts and company mismatches are part of
/// `skipped`.
#[derive(Debug, Clone, Serialize)]
pub struct RestoreReport {
    pub success: bool,
    pub added: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Conflicts left for an explicit decision (manual strategy)
    pub deferred: Vec<ConflictPair>,
    pub company_mismatches: Vec<CompanyMismatch>,
    pub companies_created: Vec<String>,
    pub run_id: String,
}

impl RestoreReport {
    fn new(context: &RunContext) -> Self {
        Self {
            success: false,
            added: 0,
            updated: 0,
            skipped: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            deferred: Vec::new(),
            company_mismatches: Vec::new(),
            companies_created: Vec::new(),
            run_id: context.run_id.to_string(),
        }
    }

    fn failed(context: &RunContext, errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            errors,
            warnings,
            ..Self::new(context)
        }
    }

    pub fn total(&self) -> usize {
        self.added + self.updated + self.skipped
    }
}

/// Validate a snapshot document's structure
pub fn validate_backup(document: &Value) -> ValidationReport {
    let report = validate_snapshot(document);
    tracing::debug!(
        valid = report.valid,
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "Validated snapshot"
    );
    report
}

/// Classify every snapshot record against the store without writing
///
/// # Errors
///
/// Returns `InvalidSnapshot` if the document fails validation or typed
/// decoding, and store errors if the current records cannot be read.
pub fn preview_restore(conn: &Connection, document: &Value) -> Result<RestorePreview> {
    log_op_start!("preview_restore");
    let start = std::time::Instant::now();

    let result = preview_restore_impl(conn, document).map_err(|e| {
        log_op_error!(
            "preview_restore",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "preview_restore",
        duration_ms = start.elapsed().as_millis() as u64,
        add_count = result.summary.add_count as u64,
        update_count = result.summary.update_count as u64,
        skip_count = result.summary.skip_count as u64
    );
    Ok(result)
}

fn preview_restore_impl(conn: &Connection, document: &Value) -> Result<RestorePreview> {
    let snapshot = decode_validated(document)?;
    let index = load_index(conn)?;
    Ok(preview_changes(index, &snapshot.attendance_records))
}

fn decode_validated(document: &Value) -> Result<Snapshot> {
    let report = validate_snapshot(document);
    if !report.valid {
        return Err(ExError::new(ExErrorKind::InvalidSnapshot)
            .with_op("validate_snapshot")
            .with_message(report.errors.join("; ")));
    }
    Ok(Snapshot::from_value(document.clone())?)
}

fn load_index(conn: &Connection) -> Result<StoreIndex> {
    let rows = SqliteRepo::list_attendance_records(conn, &RecordFilter::default())?;
    Ok(StoreIndex::build(
        rows.iter().map(|r| (r.id, RecordEntry::from_record(r))),
    ))
}

/// Merge a snapshot document into the store in one transaction
///
/// `progress` receives `(processed, total)` every `progress_interval`
/// records and once more after the commit.
pub fn apply_restore(
    conn: &mut Connection,
    document: &Value,
    options: &RestoreOptions,
    progress: Option<&mut dyn FnMut(usize, usize)>,
) -> RestoreReport {
    let context = &options.context;
    log_op_start!(
        "apply_restore",
        run_id = context.run_id.as_str(),
        strategy = options.strategy.as_str()
    );
    let start = std::time::Instant::now();

    let validation = validate_backup(document);
    if !validation.valid {
        log_op_error!(
            "apply_restore",
            ExError::new(ExErrorKind::InvalidSnapshot),
            duration_ms = start.elapsed().as_millis() as u64,
            run_id = context.run_id.as_str()
        );
        return RestoreReport::failed(context, validation.errors, validation.warnings);
    }

    match apply_restore_impl(conn, document, options, progress) {
        Ok(mut report) => {
            let mut warnings = validation.warnings;
            warnings.append(&mut report.warnings);
            report.warnings = warnings;
            log_op_end!(
                "apply_restore",
                duration_ms = start.elapsed().as_millis() as u64,
                run_id = context.run_id.as_str(),
                added = report.added as u64,
                updated = report.updated as u64,
                skipped = report.skipped as u64
            );
            report
        }
        Err(err) => {
            log_op_error!(
                "apply_restore",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                run_id = context.run_id.as_str()
            );
            let message = match err.record_index() {
                Some(index) => format!("Error processing record {}: {}", index, err.message()),
                None => format!("Restore failed: {}", err.message()),
            };
            RestoreReport::failed(context, vec![message], validation.warnings)
        }
    }
}

fn apply_restore_impl(
    conn: &mut Connection,
    document: &Value,
    options: &RestoreOptions,
    mut progress: Option<&mut dyn FnMut(usize, usize)>,
) -> Result<RestoreReport> {
    let snapshot = decode_validated(document)?;
    let total = snapshot.attendance_records.len();
    let now = Utc::now();

    let tx = conn.transaction().map_err(from_rusqlite)?;

    let mut cache = CompanyCache::load(&tx)?;
    for company in snapshot.companies.iter().filter(|c| !c.name.trim().is_empty()) {
        cache.resolve_or_create(&tx, &company.name, now)?;
    }
    let mut index = load_index(&tx)?;

    let mut report = RestoreReport::new(&options.context);

    for (i, record) in snapshot.attendance_records.iter().enumerate() {
        apply_record(&tx, &mut cache, &mut index, record, options, now, &mut report)
            .map_err(|e| e.with_record_index(i))?;

        let processed = i + 1;
        if options.progress_interval > 0 && processed % options.progress_interval == 0 {
            if let Some(callback) = progress.as_deref_mut() {
                callback(processed, total);
            }
        }
    }

    tx.commit().map_err(from_rusqlite)?;

    if let Some(callback) = progress.as_deref_mut() {
        callback(total, total);
    }

    report.success = true;
    report.companies_created = cache.created().to_vec();
    Ok(report)
}

fn apply_record(
    conn: &Connection,
    cache: &mut CompanyCache,
    index: &mut StoreIndex,
    record: &RecordEntry,
    options: &RestoreOptions,
    now: DateTime<Utc>,
    report: &mut RestoreReport,
) -> Result<()> {
    match index.classify(record) {
        Classification::Add => {
            let fields = record.to_fields()?;
            let company_id = cache.resolve_or_create(conn, &record.company_name, now)?.id;
            let id = SqliteRepo::insert_attendance_record(conn, company_id, &fields, now)?;
            index.register(Some(id), record.clone().canonicalize().with_checksum());
            report.added += 1;
        }
        Classification::Update(pair) => {
            let decision = options.decisions.get(&pair.key).copied();
            match apply_merge_strategy(&pair.backup, &pair.store, options.strategy, decision) {
                MergeOutcome::Resolved(merged) => {
                    let id = pair.store_id.ok_or_else(|| {
                        ExError::new(ExErrorKind::Internal)
                            .with_op("apply_record")
                            .with_entity_id(pair.key.to_string())
                            .with_message("Indexed store record has no row id")
                    })?;
                    let fields = merged.to_fields()?;
                    let company_id = cache.resolve_or_create(conn, &merged.company_name, now)?.id;
                    SqliteRepo::update_attendance_record(conn, id, company_id, &fields, now)?;
                    index.register(Some(id), merged.with_checksum());
                    report.updated += 1;
                }
                MergeOutcome::Deferred => {
                    tracing::debug!(key = %pair.key, "Deferred conflict");
                    report.deferred.push(pair);
                    report.skipped += 1;
                }
            }
        }
        Classification::Skip => report.skipped += 1,
        Classification::CompanyMismatch(mismatch) => {
            report.warnings.push(mismatch.to_error().to_string());
            report.company_mismatches.push(mismatch);
            report.skipped += 1;
        }
    }
    Ok(())
}
