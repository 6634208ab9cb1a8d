//! AttendX CLI
//!
//! Command-line wrapper around backup and restore

use attendx_core::logging_facility::{init, Profile};
use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "attendx")]
#[command(about = "AttendX - attendance backup and restore", long_about = None)]
struct Cli {
    /// Path to the attendance store
    #[arg(long, global = true, default_value = ".attendx/store.db")]
    db: String,

    /// Emit JSON log lines instead of human-readable ones
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write a snapshot of the store to a file
    Backup(commands::backup::BackupArgs),
    /// Merge a snapshot file into the store
    Restore(commands::restore::RestoreArgs),
}

fn main() {
    let cli = Cli::parse();
    init(if cli.log_json {
        Profile::Production
    } else {
        Profile::Development
    });

    let result = match cli.command {
        Commands::Backup(args) => commands::backup::execute(&cli.db, args),
        Commands::Restore(args) => commands::restore::execute(&cli.db, args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
