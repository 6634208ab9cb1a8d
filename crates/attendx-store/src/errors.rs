//! Error handling for attendx-store
//!
//! Store failures surface as `ExError` with a generic message. The raw
//! SQLite text goes into the redacted detail and a debug log line only.

use attendx_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_entity_id(migration_id)
        .with_message(format!("Migration {} failed", migration_id))
        .with_detail(reason)
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::ConstraintViolation)
        .with_op("migration_checksum")
        .with_entity_id(migration_id)
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Map a rusqlite error to a store error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    tracing::debug!(error = %err, "sqlite error");

    let raw = err.to_string();
    match err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            ExError::new(ExErrorKind::ConstraintViolation)
                .with_op("sqlite")
                .with_message("Store constraint violated")
                .with_detail(raw)
        }
        rusqlite::Error::QueryReturnedNoRows => ExError::new(ExErrorKind::NotFound)
            .with_op("sqlite")
            .with_message("Row not found"),
        _ => ExError::new(ExErrorKind::Persistence)
            .with_op("sqlite")
            .with_message("Database operation failed")
            .with_detail(raw),
    }
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation)
        .with_message(err.to_string())
}

/// Create an error for a stored value that no longer parses
pub fn corrupt_row(table: &str, id: i64, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("decode_row")
        .with_entity_id(format!("{}:{}", table, id))
        .with_message("Stored row could not be decoded")
        .with_detail(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_error_is_generic() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT UNIQUE); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .map_err(from_rusqlite)
            .unwrap_err();

        assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
        assert!(!err.to_string().contains("UNIQUE"));
        assert!(err.detail().unwrap().expose().contains("UNIQUE"));
    }

    #[test]
    fn test_no_rows_is_not_found() {
        let err = from_rusqlite(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(err.kind(), ExErrorKind::NotFound);
    }
}
