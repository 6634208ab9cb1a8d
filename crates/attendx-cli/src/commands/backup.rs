//! Backup command

use attendx_core::snapshot::BackupType;
use attendx_engine::{apply_engine_command, BackupOptions, EngineCommand, EngineCommandResult};
use attendx_store::open_store;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct BackupArgs {
    /// full or incremental
    #[arg(long = "type", default_value = "full")]
    pub backup_type: String,

    /// Include records updated on or after this date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub since: Option<String>,

    /// Output file (default: backup_YYYYMMDD_HHMMSS.json)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub fn execute(db: &str, args: BackupArgs) -> Result<(), Box<dyn std::error::Error>> {
    let backup_type: BackupType = args.backup_type.parse()?;
    let since = args.since.as_deref().map(parse_since).transpose()?;
    if backup_type == BackupType::Incremental && since.is_none() {
        return Err("--since is required for incremental backups".into());
    }

    let mut conn = open_store(db)?;
    let cmd = EngineCommand::CreateBackup {
        options: BackupOptions { backup_type, since },
    };
    let EngineCommandResult::Backup(outcome) = apply_engine_command(cmd, &mut conn)? else {
        return Err("unexpected engine result".into());
    };

    let Some(snapshot) = outcome.data.filter(|_| outcome.success) else {
        return Err(outcome
            .error
            .unwrap_or_else(|| "Backup failed".to_string())
            .into());
    };

    let output = args.output.unwrap_or_else(|| {
        PathBuf::from(format!("backup_{}.json", Utc::now().format("%Y%m%d_%H%M%S")))
    });
    snapshot.write_to(&output)?;

    println!("Backup created: {}", output.display());
    println!("  type: {}", backup_type.as_str());
    println!("  companies: {}", outcome.companies_count);
    println!("  attendance records: {}", outcome.records_count);
    Ok(())
}

fn parse_since(value: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&midnight));
        }
    }
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| format!("Invalid --since value: {}", value).into())
}
