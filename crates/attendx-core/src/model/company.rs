use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Company - the tenant an attendance record belongs to
///
/// The numeric `id` is local to one store. Snapshots refer to companies by
/// `name`, which is unique within a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Store-local row id
    pub id: i64,

    /// Unique company name
    pub name: String,

    /// Timestamp when this Company was created
    pub created_at: DateTime<Utc>,
}

impl Company {
    pub fn new(id: i64, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            created_at,
        }
    }
}
