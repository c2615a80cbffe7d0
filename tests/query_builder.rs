//! Expression Builder Tests
//!
//! - Attribute names and literals never appear in expression strings
//! - Names and values maps are present iff referenced
//! - Contract violations fail at build
//! - Versioned updates condition on the version read

use chrono::{TimeZone, Utc};
use madmall_db::keys::KeyPatterns;
use madmall_db::query::{
    Operand, Operator, QueryBuilder, QueryErrorCode, QueryPresets, VersionedUpdate,
};
use serde_json::json;

// =============================================================================
// Builder safety
// =============================================================================

/// Reserved words used as attribute names stay behind placeholders.
#[test]
fn test_reserved_words_never_literal() {
    let params = QueryBuilder::new()
        .partition_key("PK", "CIRCLE#c1")
        .begins_with("SK", "MEMBER#")
        .filter_condition("status", Operator::Eq, "active")
        .filter_condition("name", Operator::Ne, Operand::value("x"))
        .filter_condition("size", Operator::Between, Operand::list([1, 10]))
        .project(["role", "status", "name"])
        .build()
        .unwrap();

    let expressions = [
        params.key_condition_expression.clone().unwrap(),
        params.filter_expression.clone().unwrap(),
        params.projection_expression.clone().unwrap(),
    ]
    .join(" ");
    for word in ["status", "name", "size", "role", "active", "CIRCLE#c1", "MEMBER#"] {
        assert!(!expressions.contains(word), "{} leaked into {}", word, expressions);
    }

    let names = params.expression_attribute_names.unwrap();
    assert!(names.values().any(|n| n == "status"));
    let values = params.expression_attribute_values.unwrap();
    assert!(values.values().any(|v| v == &json!("CIRCLE#c1")));
}

#[test]
fn test_repeated_attribute_reuses_placeholder() {
    let params = QueryBuilder::new()
        .partition_key("PK", "USER#u1")
        .filter_condition("status", Operator::Ne, "banned")
        .filter_condition("status", Operator::Ne, "deleted")
        .build()
        .unwrap();
    let names = params.expression_attribute_names.unwrap();
    assert_eq!(names.values().filter(|n| *n == "status").count(), 1);
    assert_eq!(params.expression_attribute_values.unwrap().len(), 3);
}

// =============================================================================
// Builder completeness
// =============================================================================

#[test]
fn test_empty_builder_has_no_maps() {
    let params = QueryBuilder::new().limit(10).build().unwrap();
    assert!(params.key_condition_expression.is_none());
    assert!(params.expression_attribute_names.is_none());
    assert!(params.expression_attribute_values.is_none());
    assert_eq!(params.limit, Some(10));

    let serialized = serde_json::to_value(&params).unwrap();
    assert_eq!(serialized, json!({"limit": 10}));
}

#[test]
fn test_exists_uses_names_only() {
    let params = QueryBuilder::new().exists("deletedAt").build().unwrap();
    assert!(params.expression_attribute_names.is_some());
    assert!(params.expression_attribute_values.is_none());
}

// =============================================================================
// Contract errors
// =============================================================================

#[test]
fn test_contract_violations() {
    let err = QueryBuilder::new().limit(0).build().unwrap_err();
    assert_eq!(err.code(), QueryErrorCode::InvalidLimit);

    let err = QueryBuilder::new()
        .key_condition("PK", Operator::Contains, "x")
        .build()
        .unwrap_err();
    assert_eq!(err.code(), QueryErrorCode::UnsupportedOperator);

    let err = QueryBuilder::new()
        .filter_condition("age", Operator::Between, Operand::value(3))
        .build()
        .unwrap_err();
    assert_eq!(err.code(), QueryErrorCode::InvalidOperand);

    let err = QueryBuilder::new()
        .partition_key("  ", "x")
        .build()
        .unwrap_err();
    assert_eq!(err.code(), QueryErrorCode::InvalidAttribute);
}

// =============================================================================
// Presets and updates
// =============================================================================

#[test]
fn test_prefix_preset_for_user_circles() {
    let params = QueryPresets::prefix(&KeyPatterns::user_circles("u1"))
        .build()
        .unwrap();
    assert!(params.index_name.is_none());
    let values = params.expression_attribute_values.unwrap();
    assert!(values.values().any(|v| v == &json!("USER#u1")));
    assert!(values.values().any(|v| v == &json!("CIRCLE#")));
}

#[test]
fn test_versioned_update_conditions_on_read_version() {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let update = VersionedUpdate::new("USER#u1", "PROFILE", 3, at)
        .set("bio", "hello")
        .build()
        .unwrap();

    assert_eq!(update.condition_expression, "#version = :currentVersion");
    assert_eq!(update.expression_attribute_values[":currentVersion"], json!(3));
    assert_eq!(update.expression_attribute_values[":version"], json!(4));
    assert_eq!(
        update.expression_attribute_values[":updatedAt"],
        json!("2024-05-01T12:00:00.000Z")
    );
    assert!(!update.update_expression.contains("bio"));

    let err = VersionedUpdate::new("USER#u1", "PROFILE", 3, at)
        .set("PK", "USER#u2")
        .build()
        .unwrap_err();
    assert_eq!(err.code(), QueryErrorCode::ProtectedAttribute);
}
