//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names consistent between the engine, the store
//! and the test capture layer.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_RUN_ID: &str = "run_id";

// Record identity
pub const FIELD_EP_NO: &str = "ep_no";
pub const FIELD_COMPANY_NAME: &str = "company_name";
pub const FIELD_RECORD_INDEX: &str = "record_index";

// Restore counters
pub const FIELD_ADDED: &str = "added";
pub const FIELD_UPDATED: &str = "updated";
pub const FIELD_SKIPPED: &str = "skipped";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
