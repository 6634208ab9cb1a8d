//! Structural validation of inbound snapshot documents.
//!
//! Works on an untyped `serde_json::Value` so that every problem can be
//! reported, rather than stopping at the first decode failure.

use super::format::RecordEntry;
use serde::Serialize;
use serde_json::{Map, Value};

/// Number of leading records checked for required fields
pub const RECORD_SAMPLE_SIZE: usize = 10;

const REQUIRED_TOP_LEVEL: [&str; 3] = ["metadata", "companies", "attendance_records"];

const REQUIRED_METADATA: [&str; 5] = [
    "version",
    "created_at",
    "backup_type",
    "total_companies",
    "total_attendance_records",
];

const REQUIRED_RECORD_FIELDS: [&str; 5] = ["ep_no", "ep_name", "company_name", "date", "status"];

/// Outcome of validating a snapshot document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn finish(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Validate the structure of a snapshot document.
///
/// Missing top-level keys stop validation immediately. Everything after that
/// is collected. Count mismatches between metadata and arrays are warnings.
pub fn validate_snapshot(document: &Value) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let Some(root) = document.as_object() else {
        errors.push("Backup data must be a JSON object".to_string());
        return ValidationReport::finish(errors, warnings);
    };

    for key in REQUIRED_TOP_LEVEL {
        if !root.contains_key(key) {
            errors.push(format!("Missing required field: {}", key));
        }
    }
    if !errors.is_empty() {
        return ValidationReport::finish(errors, warnings);
    }

    let metadata = root["metadata"].as_object();
    match metadata {
        Some(metadata) => {
            for key in REQUIRED_METADATA {
                if !metadata.contains_key(key) {
                    errors.push(format!("Missing required metadata field: {}", key));
                }
            }
            if let Some(value) = metadata.get("backup_type") {
                if !matches!(value.as_str(), Some("full" | "incremental")) {
                    errors.push(format!("Unknown backup type: {}", value));
                }
            }
        }
        None => errors.push("Metadata must be an object".to_string()),
    }

    let companies = root["companies"].as_array();
    match companies {
        Some(companies) => {
            for (i, company) in companies.iter().enumerate() {
                match company.as_object() {
                    Some(company) if !company.contains_key("name") => {
                        errors.push(format!("Company at index {} missing required field: name", i));
                    }
                    Some(_) => {}
                    None => errors.push(format!("Company at index {} must be an object", i)),
                }
            }
        }
        None => errors.push("Companies must be a list".to_string()),
    }

    let records = root["attendance_records"].as_array();
    match records {
        Some(records) => {
            for (i, record) in records.iter().take(RECORD_SAMPLE_SIZE).enumerate() {
                match record.as_object() {
                    Some(record) => check_record(i, record, &mut errors),
                    None => errors.push(format!("Record at index {} must be an object", i)),
                }
            }
            for (i, record) in records.iter().enumerate() {
                if has_stale_checksum(record) {
                    warnings.push(format!(
                        "Record at index {} checksum does not match its fields",
                        i
                    ));
                }
            }
        }
        None => errors.push("Attendance records must be a list".to_string()),
    }

    if let Some(metadata) = metadata {
        if let Some(companies) = companies {
            check_count(metadata, "total_companies", "Company", companies.len(), &mut warnings);
        }
        if let Some(records) = records {
            check_count(
                metadata,
                "total_attendance_records",
                "Record",
                records.len(),
                &mut warnings,
            );
        }
    }

    ValidationReport::finish(errors, warnings)
}

// Reports only the first missing field of a record.
fn check_record(index: usize, record: &Map<String, Value>, errors: &mut Vec<String>) {
    for field in REQUIRED_RECORD_FIELDS {
        match record.get(field) {
            None => {
                errors.push(format!(
                    "Record at index {} missing required field: {}",
                    index, field
                ));
                return;
            }
            Some(Value::String(_)) => {}
            Some(_) => {
                errors.push(format!(
                    "Record at index {} field {} must be a string",
                    index, field
                ));
                return;
            }
        }
    }
}

// Records without an embedded checksum, or that do not decode, are left to
// the other checks.
fn has_stale_checksum(record: &Value) -> bool {
    if !record.get("checksum").is_some_and(Value::is_string) {
        return false;
    }
    serde_json::from_value::<RecordEntry>(record.clone())
        .is_ok_and(|entry| !entry.checksum_is_current())
}

fn check_count(
    metadata: &Map<String, Value>,
    key: &str,
    label: &str,
    actual: usize,
    warnings: &mut Vec<String>,
) {
    let declared = metadata.get(key).cloned().unwrap_or(Value::Null);
    if declared.as_u64() != Some(actual as u64) {
        warnings.push(format!(
            "{} count mismatch: metadata says {}, found {}",
            label, declared, actual
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_document() -> Value {
        json!({
            "metadata": {
                "version": "1.0",
                "created_at": "2025-01-12T00:00:00+00:00",
                "backup_type": "full",
                "total_companies": 1,
                "total_attendance_records": 1
            },
            "companies": [{ "name": "Acme" }],
            "attendance_records": [{
                "ep_no": "E1",
                "ep_name": "Asha",
                "company_name": "Acme",
                "date": "2025-01-10",
                "status": "P"
            }]
        })
    }

    #[test]
    fn test_valid_document() {
        let report = validate_snapshot(&valid_document());
        assert!(report.valid, "{:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_non_object_rejected() {
        let report = validate_snapshot(&json!([1, 2]));
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["Backup data must be a JSON object"]);
    }

    #[test]
    fn test_missing_top_level_short_circuits() {
        let report = validate_snapshot(&json!({ "metadata": "oops" }));
        assert_eq!(
            report.errors,
            vec![
                "Missing required field: companies",
                "Missing required field: attendance_records"
            ]
        );
    }

    #[test]
    fn test_missing_metadata_fields() {
        let mut doc = valid_document();
        doc["metadata"].as_object_mut().unwrap().remove("version");
        doc["metadata"].as_object_mut().unwrap().remove("backup_type");

        let report = validate_snapshot(&doc);
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec![
                "Missing required metadata field: version",
                "Missing required metadata field: backup_type"
            ]
        );
    }

    #[test]
    fn test_company_entries_checked() {
        let mut doc = valid_document();
        doc["companies"] = json!([{ "name": "Acme" }, {}, "Globex"]);
        doc["metadata"]["total_companies"] = json!(3);

        let report = validate_snapshot(&doc);
        assert_eq!(
            report.errors,
            vec![
                "Company at index 1 missing required field: name",
                "Company at index 2 must be an object"
            ]
        );
    }

    #[test]
    fn test_only_first_missing_record_field_reported() {
        let mut doc = valid_document();
        doc["attendance_records"] = json!([{ "date": "2025-01-10" }]);

        let report = validate_snapshot(&doc);
        assert_eq!(
            report.errors,
            vec!["Record at index 0 missing required field: ep_no"]
        );
    }

    #[test]
    fn test_records_past_sample_not_checked() {
        let mut doc = valid_document();
        let good = doc["attendance_records"][0].clone();
        let mut records = vec![good; RECORD_SAMPLE_SIZE];
        records.push(json!({}));
        doc["metadata"]["total_attendance_records"] = json!(records.len());
        doc["attendance_records"] = Value::Array(records);

        assert!(validate_snapshot(&doc).valid);
    }

    #[test]
    fn test_count_mismatch_is_warning() {
        let mut doc = valid_document();
        doc["metadata"]["total_attendance_records"] = json!(5);

        let report = validate_snapshot(&doc);
        assert!(report.valid);
        assert_eq!(
            report.warnings,
            vec!["Record count mismatch: metadata says 5, found 1"]
        );
    }

    #[test]
    fn test_stale_checksum_is_warning() {
        let mut doc = valid_document();
        let entry: RecordEntry =
            serde_json::from_value(doc["attendance_records"][0].clone()).unwrap();
        let current = serde_json::to_value(entry.with_checksum()).unwrap();
        let mut edited = current.clone();
        edited["status"] = json!("A");
        doc["attendance_records"] = json!([current, edited]);
        doc["metadata"]["total_attendance_records"] = json!(2);

        let report = validate_snapshot(&doc);
        assert!(report.valid);
        assert_eq!(
            report.warnings,
            vec!["Record at index 1 checksum does not match its fields"]
        );
    }

    #[test]
    fn test_wrong_array_types() {
        let mut doc = valid_document();
        doc["companies"] = json!({});
        doc["attendance_records"] = json!("none");

        let report = validate_snapshot(&doc);
        assert_eq!(
            report.errors,
            vec!["Companies must be a list", "Attendance records must be a list"]
        );
        assert!(report.warnings.is_empty());
    }
}
