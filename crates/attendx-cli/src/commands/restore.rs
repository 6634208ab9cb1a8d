//! Restore command

use attendx_core::conflict::{MergeStrategy, Side};
use attendx_core::merge::MergeKey;
use attendx_core::snapshot::read_snapshot_document;
use attendx_engine::{apply_engine_command, EngineCommand, EngineCommandResult, RestoreOptions};
use attendx_store::open_store;
use clap::Args;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct RestoreArgs {
    /// Snapshot file to restore
    #[arg(long)]
    pub input: PathBuf,

    /// backup_wins, database_wins or manual
    #[arg(long, default_value = "backup_wins")]
    pub strategy: String,

    /// Show what would change without writing
    #[arg(long)]
    pub preview: bool,

    /// JSON list of `{ep_no, company_name, date, keep}` entries resolving
    /// conflicts under the manual strategy (`keep` is backup or database)
    #[arg(long)]
    pub decisions: Option<PathBuf>,
}

/// One entry of a `--decisions` file
#[derive(Debug, Deserialize)]
struct Decision {
    #[serde(flatten)]
    key: MergeKey,
    keep: Side,
}

pub fn execute(db: &str, args: RestoreArgs) -> Result<(), Box<dyn std::error::Error>> {
    let strategy: MergeStrategy = args.strategy.parse()?;
    let mut options = RestoreOptions::new(strategy);
    if let Some(path) = &args.decisions {
        if strategy != MergeStrategy::Manual {
            return Err("--decisions requires --strategy manual".into());
        }
        for decision in read_decisions(path)? {
            options = options.with_decision(decision.key, decision.keep);
        }
    }
    let document = read_snapshot_document(&args.input)?;
    let mut conn = open_store(db)?;

    let EngineCommandResult::Validation(validation) = apply_engine_command(
        EngineCommand::ValidateBackup {
            document: document.clone(),
        },
        &mut conn,
    )?
    else {
        return Err("unexpected engine result".into());
    };
    // A restore repeats these in its own report.
    if args.preview || !validation.valid {
        for warning in &validation.warnings {
            eprintln!("Warning: {}", warning);
        }
    }
    if !validation.valid {
        for error in &validation.errors {
            eprintln!("  - {}", error);
        }
        return Err("Backup validation failed".into());
    }

    if args.preview {
        let EngineCommandResult::Preview(preview) =
            apply_engine_command(EngineCommand::PreviewRestore { document }, &mut conn)?
        else {
            return Err("unexpected engine result".into());
        };
        let s = preview.summary;
        println!("Restore preview:");
        println!("  to add: {}", s.add_count);
        println!("  to update: {}", s.update_count);
        println!("  to skip: {}", s.skip_count);
        println!("  conflicts: {}", s.conflict_count);
        println!("  company mismatches: {}", s.company_mismatch_count);
        for mismatch in &preview.company_mismatches {
            println!("    {}", mismatch.to_error());
        }
        return Ok(());
    }

    let cmd = EngineCommand::ApplyRestore {
        document,
        options,
    };
    let EngineCommandResult::Restore(report) = apply_engine_command(cmd, &mut conn)? else {
        return Err("unexpected engine result".into());
    };

    for warning in &report.warnings {
        eprintln!("Warning: {}", warning);
    }
    if !report.success {
        for error in &report.errors {
            eprintln!("  - {}", error);
        }
        return Err("Restore failed".into());
    }

    println!("Restore completed ({}):", strategy);
    println!("  added: {}", report.added);
    println!("  updated: {}", report.updated);
    println!("  skipped: {}", report.skipped);
    if !report.companies_created.is_empty() {
        println!("  companies created: {}", report.companies_created.join(", "));
    }
    if !report.deferred.is_empty() {
        println!("  deferred conflicts: {}", report.deferred.len());
        for conflict in &report.deferred {
            println!("    {}", conflict.key);
        }
        println!("  resolve them with --decisions FILE");
    }
    Ok(())
}

fn read_decisions(path: &Path) -> Result<Vec<Decision>, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read decisions file {}: {}", path.display(), e))?;
    serde_json::from_str(&text)
        .map_err(|e| format!("Invalid decisions file {}: {}", path.display(), e).into())
}
