//! Correlation types for backup and restore runs
//!
//! Every backup or restore invocation gets a fresh [`RunId`] so that the
//! start/end events and per-record debug lines of one run can be grouped.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single backup or restore invocation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    /// Generate a new time-ordered RunId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried through one engine invocation
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: RunId,
    /// Who asked for the run (CLI user, web session); informational only
    pub initiator: Option<String>,
}

impl RunContext {
    /// Create a new context with a fresh RunId
    pub fn new() -> Self {
        Self {
            run_id: RunId::new(),
            initiator: None,
        }
    }

    /// Create a context around an existing RunId
    pub fn with_run_id(run_id: RunId) -> Self {
        Self {
            run_id,
            initiator: None,
        }
    }

    /// Record who initiated the run
    pub fn with_initiator(mut self, initiator: impl Into<String>) -> Self {
        self.initiator = Some(initiator.into());
        self
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}
