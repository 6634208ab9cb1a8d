//! Command orchestration layer.
//!
//! ## Logging Ownership
//!
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Store and core code only log at `debug`.

pub mod backup;
pub mod engine_command;
pub mod restore;
