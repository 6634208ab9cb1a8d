//! Single entry point for callers that route operations by value
//! (the CLI, a web handler).

use crate::commands::backup::{create_backup, BackupOptions, BackupOutcome};
use crate::commands::restore::{
    apply_restore, preview_restore, validate_backup, RestoreOptions, RestoreReport,
};
use attendx_core::merge::RestorePreview;
use attendx_core::snapshot::ValidationReport;
use attendx_store::errors::Result;
use rusqlite::Connection;
use serde_json::Value;

/// Engine operations
#[derive(Debug, Clone)]
pub enum EngineCommand {
    CreateBackup { options: BackupOptions },
    ValidateBackup { document: Value },
    PreviewRestore { document: Value },
    /// Restore without a progress callback; call [`apply_restore`] directly
    /// to observe progress.
    ApplyRestore {
        document: Value,
        options: RestoreOptions,
    },
}

/// Result of applying an engine command
#[derive(Debug, Clone)]
pub enum EngineCommandResult {
    Backup(BackupOutcome),
    Validation(ValidationReport),
    Preview(RestorePreview),
    Restore(RestoreReport),
}

/// Apply an engine command
///
/// # Errors
///
/// Only `PreviewRestore` can fail here; the other operations report
/// failure inside their result.
pub fn apply_engine_command(cmd: EngineCommand, conn: &mut Connection) -> Result<EngineCommandResult> {
    match cmd {
        EngineCommand::CreateBackup { options } => {
            Ok(EngineCommandResult::Backup(create_backup(conn, &options)))
        }
        EngineCommand::ValidateBackup { document } => {
            Ok(EngineCommandResult::Validation(validate_backup(&document)))
        }
        EngineCommand::PreviewRestore { document } => {
            preview_restore(conn, &document).map(EngineCommandResult::Preview)
        }
        EngineCommand::ApplyRestore { document, options } => Ok(EngineCommandResult::Restore(
            apply_restore(conn, &document, &options, None),
        )),
    }
}
