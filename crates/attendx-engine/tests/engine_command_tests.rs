#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use attendx_core::conflict::MergeStrategy;
use attendx_engine::{
    apply_engine_command, BackupOptions, EngineCommand, EngineCommandResult, RestoreOptions,
};
use common::{at, seed_company, setup_store};

#[test]
fn test_backup_then_restore_through_commands() {
    let (_tmp, mut source) = setup_store();
    seed_company(&source, "Acme", 3, at(10, 18));

    let EngineCommandResult::Backup(outcome) = apply_engine_command(
        EngineCommand::CreateBackup {
            options: BackupOptions::full(),
        },
        &mut source,
    )
    .unwrap() else {
        panic!("expected a backup result");
    };
    let document = outcome.data.unwrap().to_value().unwrap();

    let (_tmp2, mut target) = setup_store();

    let EngineCommandResult::Validation(report) = apply_engine_command(
        EngineCommand::ValidateBackup {
            document: document.clone(),
        },
        &mut target,
    )
    .unwrap() else {
        panic!("expected a validation result");
    };
    assert!(report.valid);

    let EngineCommandResult::Preview(preview) = apply_engine_command(
        EngineCommand::PreviewRestore {
            document: document.clone(),
        },
        &mut target,
    )
    .unwrap() else {
        panic!("expected a preview result");
    };
    assert_eq!(preview.summary.add_count, 3);

    let EngineCommandResult::Restore(restored) = apply_engine_command(
        EngineCommand::ApplyRestore {
            document,
            options: RestoreOptions::new(MergeStrategy::BackupWins),
        },
        &mut target,
    )
    .unwrap() else {
        panic!("expected a restore result");
    };
    assert!(restored.success);
    assert_eq!(restored.added, 3);
}

#[test]
fn test_preview_of_invalid_document_is_an_error() {
    let (_tmp, mut conn) = setup_store();
    let err = apply_engine_command(
        EngineCommand::PreviewRestore {
            document: serde_json::json!([]),
        },
        &mut conn,
    )
    .unwrap_err();

    assert_eq!(err.kind(), attendx_core::errors::ExErrorKind::InvalidSnapshot);
}
