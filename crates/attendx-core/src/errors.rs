use attendx_core_types::{RunId, Sensitive};
use thiserror::Error;

/// Result type alias using SyncError
pub type Result<T> = std::result::Result<T, SyncError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers (CLI, web layer) can
/// match on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    InvalidSnapshot,
    MissingField,
    InvalidFieldValue,
    NotFound,
    AlreadyExists,
    ConstraintViolation,

    // Merge
    UnknownStrategy,
    CompanyMismatch,

    // Integration/IO
    Io,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidSnapshot => "ERR_INVALID_SNAPSHOT",
            ExErrorKind::MissingField => "ERR_MISSING_FIELD",
            ExErrorKind::InvalidFieldValue => "ERR_INVALID_FIELD_VALUE",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::UnknownStrategy => "ERR_UNKNOWN_STRATEGY",
            ExErrorKind::CompanyMismatch => "ERR_COMPANY_MISMATCH",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Crosses crate boundaries (store, engine). Store-internal text is kept in
/// `detail`, which redacts itself in `Debug` and is never part of `Display`.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    record_index: Option<usize>,
    run_id: Option<RunId>,
    message: String,
    detail: Option<Sensitive<String>>,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            record_index: None,
            run_id: None,
            message: String::new(),
            detail: None,
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity context (company name, merge key, file path)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add the position of the offending record in the snapshot
    pub fn with_record_index(mut self, index: usize) -> Self {
        self.record_index = Some(index);
        self
    }

    /// Add run correlation
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach store-internal detail that must not reach end users
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(Sensitive::new(detail.into()));
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the record index, if any
    pub fn record_index(&self) -> Option<usize> {
        self.record_index
    }

    /// Get the run id, if any
    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the redacted store detail, if any
    pub fn detail(&self) -> Option<&Sensitive<String>> {
        self.detail.as_ref()
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity: {})", entity_id)?;
        }
        if let Some(index) = self.record_index {
            write!(f, " (record: {})", index)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain errors raised by the sync layer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    // ===== Argument Errors =====
    /// Merge strategy string is not one of backup_wins / database_wins / manual
    #[error("Unknown merge strategy: {strategy}")]
    UnknownStrategy { strategy: String },

    /// Backup type string is not one of full / incremental
    #[error("Unknown backup type: {value}")]
    UnknownBackupType { value: String },

    /// Incremental backup requested without a since date
    #[error("Incremental backup requires a since date")]
    MissingSinceDate,

    // ===== Snapshot Errors =====
    /// Snapshot failed structural validation
    #[error("Invalid snapshot: {}", errors.join("; "))]
    InvalidSnapshot { errors: Vec<String> },

    // ===== Record Field Errors =====
    /// Attendance status is not a known code
    #[error("Invalid attendance status: {value:?}")]
    InvalidStatus { value: String },

    /// Date field is not YYYY-MM-DD
    #[error("Invalid date in field {field}: {value:?}")]
    InvalidDate { field: String, value: String },

    /// Time field is not HH:MM
    #[error("Invalid time in field {field}: {value:?}")]
    InvalidTime { field: String, value: String },

    /// Timestamp field is not RFC 3339
    #[error("Invalid timestamp in field {field}: {value:?}")]
    InvalidTimestamp { field: String, value: String },

    /// Record references no company
    #[error("Record for employee {ep_no} has no company name")]
    MissingCompanyName { ep_no: String },

    // ===== Merge Errors =====
    /// Store holds the same (ep_no, date) under a different company
    #[error("Employee {ep_no} on {date} belongs to {store_company} in the store, not {backup_company}")]
    CompanyMismatch {
        ep_no: String,
        date: String,
        backup_company: String,
        store_company: String,
    },

    // ===== Generic Errors =====
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<SyncError> for ExError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::UnknownStrategy { strategy } => ExError::new(ExErrorKind::UnknownStrategy)
                .with_entity_id(strategy)
                .with_message("Unknown merge strategy"),

            SyncError::UnknownBackupType { value } => ExError::new(ExErrorKind::InvalidInput)
                .with_entity_id(value)
                .with_message("Unknown backup type"),

            SyncError::MissingSinceDate => ExError::new(ExErrorKind::InvalidInput)
                .with_message("Incremental backup requires a since date"),

            SyncError::InvalidSnapshot { errors } => ExError::new(ExErrorKind::InvalidSnapshot)
                .with_message(errors.join("; ")),

            SyncError::InvalidStatus { value } => ExError::new(ExErrorKind::InvalidFieldValue)
                .with_entity_id("status")
                .with_message(format!("Invalid attendance status: {:?}", value)),

            SyncError::InvalidDate { field, value }
            | SyncError::InvalidTime { field, value }
            | SyncError::InvalidTimestamp { field, value } => {
                ExError::new(ExErrorKind::InvalidFieldValue)
                    .with_entity_id(field)
                    .with_message(format!("Invalid value {:?}", value))
            }

            SyncError::MissingCompanyName { ep_no } => ExError::new(ExErrorKind::MissingField)
                .with_entity_id(ep_no)
                .with_message("Record has no company name"),

            err @ SyncError::CompanyMismatch { .. } => {
                ExError::new(ExErrorKind::CompanyMismatch).with_message(err.to_string())
            }

            SyncError::Io { path, message } => ExError::new(ExErrorKind::Io)
                .with_entity_id(path)
                .with_message(message),

            SyncError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            SyncError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}
