//! Content checksums for snapshot entries.
//!
//! A checksum is the SHA-256 of a canonical JSON object built from an entry's
//! business fields:
//!
//! - `checksum`, `created_at`, `updated_at` and `id` are never hashed
//! - keys are sorted lexicographically
//! - values are strings; `null` and `""` both hash as `null`
//! - compact separators, UTF-8
//!
//! Two producers that agree on the business fields therefore agree on the
//! checksum, regardless of timestamps or row ids.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Fields stripped before hashing
pub const EXCLUDED_FIELDS: [&str; 4] = ["checksum", "created_at", "updated_at", "id"];

/// Compute the checksum of a list of named string fields.
///
/// Excluded field names are dropped even if supplied. Returns 64 lowercase
/// hex characters.
pub fn checksum_fields<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let canonical: BTreeMap<&str, Value> = fields
        .into_iter()
        .filter(|(name, _)| !EXCLUDED_FIELDS.contains(name))
        .map(|(name, value)| (name, normalize(value)))
        .collect();

    hash_canonical(canonical)
}

/// Check that a string looks like a checksum produced by this module.
pub fn is_well_formed(checksum: &str) -> bool {
    checksum.len() == 64
        && checksum
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

fn normalize(value: Option<&str>) -> Value {
    match value {
        None | Some("") => Value::Null,
        Some(s) => Value::String(s.to_string()),
    }
}

fn hash_canonical(canonical: BTreeMap<&str, Value>) -> String {
    // Map insertion follows BTreeMap order, so the object is key-sorted
    // whether or not serde_json preserves insertion order.
    let object: Map<String, Value> = canonical
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    let json = Value::Object(object).to_string();

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    hex::encode(hasher.finalize())
}
