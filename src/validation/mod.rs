//! Validation engine
//!
//! Validators inspect the JSON form of a record and never fail: every
//! finding lands in a [`ValidationReport`] as an error (blocks the write) or
//! a warning (informational).
//!
//! Layers, cheapest first:
//!
//! 1. [`validate_keys`]: key attributes and the shared envelope
//! 2. [`validate_consistency`]: cross-field invariants
//! 3. [`validate_entity`]: rules of the schema named by `entityType`
//!
//! [`validate_record`] runs all three in order.

mod entities;
mod formats;
mod keys;
mod report;
mod rules;

pub use entities::{
    validate_advisory_review, validate_as, validate_business, validate_circle, validate_entity,
    validate_feedback, validate_image_asset, validate_incident, validate_personalization,
    validate_premium_source, validate_resource, validate_story, validate_user,
};
pub use formats::{is_canonical_timestamp, is_email, is_phone, is_url};
pub use keys::{
    validate_batch, validate_batch_value, validate_consistency, validate_consistency_at,
    validate_keys, DEFAULT_MAX_BATCH_SIZE,
};
pub use report::{IssueCode, ValidationIssue, ValidationReport};
pub use rules::{apply_rules, FieldRule, FieldType};

use serde_json::Value;

/// Full check of a stored record: keys, consistency, then schema rules
pub fn validate_record(record: &Value) -> ValidationReport {
    let mut report = validate_keys(record);
    report.merge(validate_consistency(record));
    report.merge(validate_entity(record));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_record_layers() {
        let record = json!({
            "PK": "CIRCLE#c1",
            "SK": "METADATA",
            "entityType": "CIRCLE",
            "version": 1,
            "createdAt": "2024-03-01T00:00:00.000Z",
            "updatedAt": "2024-02-01T00:00:00.000Z",
            "circleId": "c1",
            "name": "ab",
            "type": "support",
            "createdBy": "u1"
        });
        let report = validate_record(&record);
        let codes: Vec<IssueCode> = report.errors().iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![IssueCode::ConsistencyError, IssueCode::MinLength]);
        assert_eq!(
            report.error_summary(),
            "Created timestamp cannot be after updated timestamp, Circle name must be at least 3 characters"
        );
    }
}
