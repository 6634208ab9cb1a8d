//! AttendX Engine - Backup and restore orchestration
//!
//! Coordinates the pure snapshot/merge logic of `attendx-core` with the
//! SQLite store. Each public operation is one synchronous batch run and owns
//! its lifecycle logging.

pub mod commands;
pub mod company_cache;

pub use commands::backup::{create_backup, create_incremental_backup, BackupOptions, BackupOutcome};
pub use commands::engine_command::{apply_engine_command, EngineCommand, EngineCommandResult};
pub use commands::restore::{
    apply_restore, preview_restore, validate_backup, RestoreOptions, RestoreReport,
    DEFAULT_PROGRESS_INTERVAL,
};
pub use company_cache::CompanyCache;
