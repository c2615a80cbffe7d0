//! Structural validation of stored records: keys, envelope, batches

use chrono::Utc;
use serde_json::{json, Value};

use super::formats::is_canonical_timestamp;
use super::report::{IssueCode, ValidationIssue, ValidationReport};
use crate::document::{is_truthy, parse_timestamp};

/// Largest batch the store accepts in one write
pub const DEFAULT_MAX_BATCH_SIZE: usize = 25;

/// Checks the key attributes and envelope fields every record carries
pub fn validate_keys(record: &Value) -> ValidationReport {
    let mut report = ValidationReport::new();

    for (field, label) in [("PK", "Partition key (PK)"), ("SK", "Sort key (SK)")] {
        let value = record.get(field);
        if !is_truthy(value) {
            report.error(field, &format!("{} is required", label), IssueCode::Required);
        } else if !value.is_some_and(Value::is_string) {
            report.error(field, &format!("{} must be a string", label), IssueCode::TypeError);
        }
    }

    if !is_truthy(record.get("entityType")) {
        report.error("entityType", "Entity type is required", IssueCode::Required);
    }

    match record.get("version") {
        None | Some(Value::Null) => report.error(
            "version",
            "Version is required for optimistic locking",
            IssueCode::Required,
        ),
        Some(Value::Number(n)) if n.as_u64().is_some() => {}
        Some(value) => report.error_with(
            "version",
            "Version must be a non-negative integer",
            IssueCode::TypeError,
            value.clone(),
        ),
    }

    for (field, label) in [("createdAt", "Created"), ("updatedAt", "Updated")] {
        let value = record.get(field);
        if !is_truthy(value) {
            report.error(
                field,
                &format!("{} timestamp is required", label),
                IssueCode::Required,
            );
        } else if !value.and_then(Value::as_str).is_some_and(is_canonical_timestamp) {
            report.error_with(
                field,
                &format!("{} timestamp must be a valid ISO date string", label),
                IssueCode::InvalidFormat,
                value.cloned().unwrap_or(Value::Null),
            );
        }
    }

    report
}

/// Cross-field invariants: `createdAt <= updatedAt`, ttl not elapsed
pub fn validate_consistency(record: &Value) -> ValidationReport {
    validate_consistency_at(record, Utc::now().timestamp())
}

/// [`validate_consistency`] against an explicit clock (epoch seconds)
pub fn validate_consistency_at(record: &Value, now_epoch_secs: i64) -> ValidationReport {
    let mut report = ValidationReport::new();

    let created = record.get("createdAt");
    let updated = record.get("updatedAt");
    if is_truthy(created) && is_truthy(updated) {
        let created_at = created.and_then(parse_timestamp);
        let updated_at = updated.and_then(parse_timestamp);
        if let (Some(c), Some(u)) = (created_at, updated_at) {
            if c > u {
                report.error_with(
                    "timestamps",
                    "Created timestamp cannot be after updated timestamp",
                    IssueCode::ConsistencyError,
                    json!({ "createdAt": created, "updatedAt": updated }),
                );
            }
        }
    }

    let ttl = record.get("ttl");
    if is_truthy(ttl) {
        if let Some(expiry) = ttl.and_then(Value::as_f64) {
            if expiry < now_epoch_secs as f64 {
                report.warning_with(
                    "ttl",
                    "TTL is in the past, item may be deleted",
                    IssueCode::TtlWarning,
                    ttl.cloned().unwrap_or(Value::Null),
                );
            }
        }
    }

    report
}

/// Validates a write batch: size limits plus [`validate_keys`] per item.
/// Item issues are reported as `items[i].<field>`.
pub fn validate_batch(items: &[Value], max_batch_size: usize) -> ValidationReport {
    let mut report = ValidationReport::new();

    if items.is_empty() {
        report.error("items", "Batch cannot be empty", IssueCode::EmptyBatch);
    }
    if items.len() > max_batch_size {
        report.error_with(
            "items",
            &format!("Batch size cannot exceed {}", max_batch_size),
            IssueCode::BatchSizeExceeded,
            items.len(),
        );
    }

    for (index, item) in items.iter().enumerate() {
        let item_report = validate_keys(item);
        for issue in item_report.errors() {
            report.push_error(ValidationIssue {
                field: format!("items[{}].{}", index, issue.field),
                message: format!("Item {}: {}", index, issue.message),
                code: issue.code,
                value: issue.value.clone(),
            });
        }
    }

    report
}

/// [`validate_batch`] over an untyped value that must be an array
pub fn validate_batch_value(items: &Value, max_batch_size: usize) -> ValidationReport {
    match items.as_array() {
        Some(items) => validate_batch(items, max_batch_size),
        None => {
            let mut report = ValidationReport::new();
            report.error("items", "Items must be an array", IssueCode::TypeError);
            report
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_record() -> Value {
        json!({
            "PK": "USER#u1",
            "SK": "PROFILE",
            "entityType": "USER",
            "version": 1,
            "createdAt": "2024-01-15T08:00:00.000Z",
            "updatedAt": "2024-01-15T08:00:00.000Z"
        })
    }

    #[test]
    fn test_valid_keys() {
        let report = validate_keys(&valid_record());
        assert!(report.is_valid(), "{:?}", report.errors());
    }

    #[test]
    fn test_missing_fields_yield_single_error_each() {
        let report = validate_keys(&json!({}));
        let fields: Vec<&str> = report.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["PK", "SK", "entityType", "version", "createdAt", "updatedAt"]
        );
        assert!(report.errors().iter().all(|e| e.code == IssueCode::Required));
    }

    #[test]
    fn test_type_and_format_errors() {
        let mut record = valid_record();
        record["PK"] = json!(42);
        record["version"] = json!(-1);
        record["createdAt"] = json!("2024-01-15T08:00:00Z");

        let report = validate_keys(&record);
        let codes: Vec<(&str, IssueCode)> = report
            .errors()
            .iter()
            .map(|e| (e.field.as_str(), e.code))
            .collect();
        assert_eq!(
            codes,
            vec![
                ("PK", IssueCode::TypeError),
                ("version", IssueCode::TypeError),
                ("createdAt", IssueCode::InvalidFormat),
            ]
        );
    }

    #[test]
    fn test_version_zero_is_valid() {
        let mut record = valid_record();
        record["version"] = json!(0);
        assert!(validate_keys(&record).is_valid());
    }

    #[test]
    fn test_version_must_be_an_integer() {
        for version in [json!(1.5), json!(-1), json!(1.0), json!("1")] {
            let mut record = valid_record();
            record["version"] = version.clone();
            let report = validate_keys(&record);
            assert!(!report.is_valid(), "{} accepted", version);
            assert_eq!(report.errors()[0].field, "version");
            assert_eq!(report.errors()[0].code, IssueCode::TypeError);
            assert_eq!(report.errors()[0].value, Some(version));
        }
    }

    #[test]
    fn test_consistency_created_after_updated() {
        let mut record = valid_record();
        record["createdAt"] = json!("2024-02-01T00:00:00.000Z");
        let report = validate_consistency_at(&record, 0);
        assert!(!report.is_valid());
        let issue = &report.errors()[0];
        assert_eq!(issue.field, "timestamps");
        assert_eq!(issue.code, IssueCode::ConsistencyError);
        assert_eq!(
            issue.value,
            Some(json!({
                "createdAt": "2024-02-01T00:00:00.000Z",
                "updatedAt": "2024-01-15T08:00:00.000Z"
            }))
        );
    }

    #[test]
    fn test_elapsed_ttl_is_warning_only() {
        let mut record = valid_record();
        record["ttl"] = json!(1_000);
        let report = validate_consistency_at(&record, 2_000);
        assert!(report.is_valid());
        assert_eq!(report.warnings()[0].code, IssueCode::TtlWarning);

        let report = validate_consistency_at(&record, 500);
        assert!(report.warnings().is_empty());
    }

    #[test]
    fn test_batch_limits() {
        let report = validate_batch(&[], DEFAULT_MAX_BATCH_SIZE);
        assert_eq!(report.errors()[0].code, IssueCode::EmptyBatch);

        let items = vec![valid_record(); 26];
        let report = validate_batch(&items, DEFAULT_MAX_BATCH_SIZE);
        assert_eq!(report.errors().len(), 1);
        assert_eq!(report.errors()[0].code, IssueCode::BatchSizeExceeded);
        assert_eq!(report.errors()[0].value, Some(json!(26)));

        assert!(validate_batch(&items[..25], DEFAULT_MAX_BATCH_SIZE).is_valid());
    }

    #[test]
    fn test_batch_item_errors_are_prefixed() {
        let mut bad = valid_record();
        bad.as_object_mut().unwrap().remove("SK");
        let report = validate_batch(&[valid_record(), bad], DEFAULT_MAX_BATCH_SIZE);
        assert_eq!(report.errors().len(), 1);
        assert_eq!(report.errors()[0].field, "items[1].SK");
        assert_eq!(report.errors()[0].message, "Item 1: Sort key (SK) is required");
    }

    #[test]
    fn test_batch_value_must_be_array() {
        let report = validate_batch_value(&json!({"PK": "x"}), DEFAULT_MAX_BATCH_SIZE);
        assert_eq!(report.errors()[0].code, IssueCode::TypeError);
    }
}
