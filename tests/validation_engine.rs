//! Validation Engine Tests
//!
//! - A record reported valid has keys, envelope and required fields
//! - Missing fields produce exactly one REQUIRED error
//! - Warnings never make a record invalid
//! - Cross-field consistency is enforced
//! - Batches respect the write limit

use madmall_db::validation::{
    apply_rules, validate_batch, validate_consistency_at, validate_record, validate_user,
    FieldRule, FieldType, IssueCode, DEFAULT_MAX_BATCH_SIZE,
};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn user_record() -> Value {
    json!({
        "PK": "USER#u1",
        "SK": "PROFILE",
        "GSI1PK": "EMAIL#a@b.com",
        "GSI1SK": "USER#u1",
        "entityType": "USER",
        "version": 1,
        "createdAt": "2024-01-15T08:00:00.000Z",
        "updatedAt": "2024-01-16T08:00:00.000Z",
        "userId": "u1",
        "email": "a@b.com",
        "profile": {"firstName": "Ada", "lastName": "Moss"}
    })
}

// =============================================================================
// Soundness
// =============================================================================

#[test]
fn test_complete_record_is_valid() {
    let report = validate_record(&user_record());
    assert!(report.is_valid(), "{:?}", report.errors());
}

#[test]
fn test_each_missing_field_reports_once() {
    for field in ["userId", "email"] {
        let mut record = user_record();
        record.as_object_mut().unwrap().remove(field);

        let report = validate_user(&record);
        assert!(!report.is_valid());
        let hits: Vec<_> = report.errors().iter().filter(|i| i.field == field).collect();
        assert_eq!(hits.len(), 1, "{}", field);
        assert_eq!(hits[0].code, IssueCode::Required);
    }
}

#[test]
fn test_missing_keys_block_record() {
    let mut record = user_record();
    record.as_object_mut().unwrap().remove("PK");
    record["version"] = json!(-1);

    let report = validate_record(&record);
    assert!(report.errors().iter().any(|i| i.field == "PK"));
    assert!(report.errors().iter().any(|i| i.field == "version"));
}

#[test]
fn test_validation_is_deterministic() {
    let mut record = user_record();
    record["email"] = json!("not-an-email");
    let first = validate_record(&record);
    for _ in 0..20 {
        assert_eq!(validate_record(&record), first);
    }
    assert_eq!(first.error_summary(), "Invalid email format");
}

// =============================================================================
// Consistency
// =============================================================================

#[test]
fn test_updated_before_created_is_rejected() {
    let mut record = user_record();
    record["updatedAt"] = json!("2024-01-01T00:00:00.000Z");

    let report = validate_record(&record);
    assert!(report.has_code(IssueCode::ConsistencyError));
}

#[test]
fn test_elapsed_ttl_warns_only() {
    let mut record = user_record();
    record["ttl"] = json!(1_000);

    let report = validate_consistency_at(&record, 2_000);
    assert!(report.is_valid());
    assert!(report.has_code(IssueCode::TtlWarning));
}

// =============================================================================
// Batches and rules
// =============================================================================

#[test]
fn test_batch_limits() {
    assert!(validate_batch(&[], DEFAULT_MAX_BATCH_SIZE).has_code(IssueCode::EmptyBatch));

    let oversized: Vec<Value> = (0..26).map(|_| user_record()).collect();
    assert!(validate_batch(&oversized, DEFAULT_MAX_BATCH_SIZE).has_code(IssueCode::BatchSizeExceeded));

    let full: Vec<Value> = (0..25).map(|_| user_record()).collect();
    assert!(validate_batch(&full, DEFAULT_MAX_BATCH_SIZE).is_valid());
}

#[test]
fn test_configurable_rules() {
    let rules = vec![
        FieldRule::new("profile.firstName").required().length(Some(2), Some(20)),
        FieldRule::new("email").of_type(FieldType::String).pattern(r"^[^@]+@b\.com$"),
        FieldRule::new("tier").one_of(vec![json!("free"), json!("premium")]),
    ];
    assert!(apply_rules(&rules, &user_record()).is_valid());

    let mut record = user_record();
    record["profile"]["firstName"] = json!("A");
    record["tier"] = json!("gold");
    let report = apply_rules(&rules, &record);
    assert_eq!(
        report.error_summary(),
        "profile.firstName must be at least 2 characters, tier must be one of the allowed values"
    );
}
