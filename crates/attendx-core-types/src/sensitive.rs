//! Sensitive data marker for automatic redaction
//!
//! Raw SQLite driver messages can name tables, columns and constraint
//! internals. They are kept inside `Sensitive<T>` so an error can be logged
//! or shown to an end user without leaking them.

use std::fmt;

/// Wrapper for sensitive data that redacts itself in Debug and Display
///
/// # Example
///
/// ```
/// use attendx_core_types::Sensitive;
///
/// let detail = Sensitive::new("UNIQUE constraint failed: companies.name");
/// assert_eq!(format!("{:?}", detail), "***REDACTED***");
/// assert_eq!(format!("{}", detail), "***REDACTED***");
///
/// assert_eq!(detail.expose(), &"UNIQUE constraint failed: companies.name");
/// ```
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a sensitive value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying value (debug logging only)
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T: Clone> Clone for Sensitive<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
