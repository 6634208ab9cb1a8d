//! Migration framework
//!
//! - Embedded SQL migrations applied in order
//! - Each applied migration is recorded with its checksum
//! - Re-running is a no-op; an edited migration is rejected

mod checksums;
mod embedded;
mod runner;

pub use runner::{applied_migrations, apply_migrations};
