//! Optimistic-concurrency update expressions
//!
//! An update always writes `updatedAt` and `version + 1` and is
//! conditioned on the version the caller read. A concurrent writer that
//! got there first makes the condition fail, so stale writes are rejected
//! by the store rather than silently overwriting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::builder::check_attribute;
use super::errors::{QueryError, QueryResult};
use super::params::Placeholders;
use crate::entity::StorageRecord;
use crate::keys::iso_timestamp;

/// Attributes an update may never assign directly
pub const PROTECTED_ATTRIBUTES: [&str; 5] = ["PK", "SK", "createdAt", "updatedAt", "version"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParams {
    pub key: Map<String, Value>,
    pub update_expression: String,
    pub condition_expression: String,
    pub expression_attribute_names: BTreeMap<String, String>,
    pub expression_attribute_values: BTreeMap<String, Value>,
}

#[derive(Debug, Clone)]
pub struct VersionedUpdate {
    pk: String,
    sk: String,
    current_version: u64,
    updated_at: String,
    sets: Vec<(String, Value)>,
}

impl VersionedUpdate {
    pub fn new(
        pk: impl Into<String>,
        sk: impl Into<String>,
        current_version: u64,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
            current_version,
            updated_at: iso_timestamp(at),
            sets: Vec::new(),
        }
    }

    /// An update of `record` as it was read
    pub fn for_record(record: &StorageRecord, at: DateTime<Utc>) -> Self {
        Self::new(record.pk.clone(), record.sk.clone(), record.version, at)
    }

    /// Assigns an attribute. Setting the same attribute twice keeps the
    /// last value.
    pub fn set(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        let attribute = attribute.into();
        let value = value.into();
        match self.sets.iter_mut().find(|(name, _)| *name == attribute) {
            Some(slot) => slot.1 = value,
            None => self.sets.push((attribute, value)),
        }
        self
    }

    pub fn next_version(&self) -> u64 {
        self.current_version + 1
    }

    pub fn build(self) -> QueryResult<UpdateParams> {
        let mut placeholders = Placeholders::new();
        let mut assignments = Vec::with_capacity(self.sets.len() + 2);

        for (attribute, value) in &self.sets {
            check_attribute(attribute)?;
            if PROTECTED_ATTRIBUTES.contains(&attribute.as_str()) {
                return Err(QueryError::protected_attribute(attribute));
            }
            let name = placeholders.name(attribute);
            let value = placeholders.value(value.clone());
            assignments.push(format!("{} = {}", name, value));
        }

        placeholders.named_name("#updatedAt", "updatedAt");
        placeholders.named_name("#version", "version");
        placeholders.named_value(":updatedAt", Value::String(self.updated_at.clone()));
        placeholders.named_value(":version", Value::from(self.next_version()));
        placeholders.named_value(":currentVersion", Value::from(self.current_version));
        assignments.push("#updatedAt = :updatedAt".to_string());
        assignments.push("#version = :version".to_string());

        let (names, values) = placeholders.finish();
        let mut key = Map::new();
        key.insert("PK".into(), Value::String(self.pk));
        key.insert("SK".into(), Value::String(self.sk));

        Ok(UpdateParams {
            key,
            update_expression: format!("SET {}", assignments.join(", ")),
            condition_expression: "#version = :currentVersion".to_string(),
            expression_attribute_names: names.unwrap_or_default(),
            expression_attribute_values: values.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryErrorCode;
    use chrono::TimeZone;
    use serde_json::json;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_update_expression_shape() {
        let params = VersionedUpdate::new("CIRCLE#c1", "METADATA", 3, at())
            .set("name", "Sister Circle")
            .set("status", "active")
            .build()
            .unwrap();

        assert_eq!(
            params.update_expression,
            "SET #attr0 = :val0, #attr1 = :val1, #updatedAt = :updatedAt, #version = :version"
        );
        assert_eq!(params.condition_expression, "#version = :currentVersion");
        assert_eq!(params.expression_attribute_values[":version"], json!(4));
        assert_eq!(params.expression_attribute_values[":currentVersion"], json!(3));
        assert_eq!(
            params.expression_attribute_values[":updatedAt"],
            json!("2024-06-01T00:00:00.000Z")
        );
        assert_eq!(params.expression_attribute_names["#attr0"], "name");
        assert_eq!(params.key["PK"], json!("CIRCLE#c1"));
    }

    #[test]
    fn test_repeated_set_keeps_last() {
        let params = VersionedUpdate::new("A#1", "B", 1, at())
            .set("status", "draft")
            .set("status", "published")
            .build()
            .unwrap();
        assert_eq!(params.expression_attribute_values[":val0"], json!("published"));
        assert!(!params.expression_attribute_values.contains_key(":val1"));
    }

    #[test]
    fn test_protected_attributes_rejected() {
        for attribute in PROTECTED_ATTRIBUTES {
            let err = VersionedUpdate::new("A#1", "B", 1, at())
                .set(attribute, "x")
                .build()
                .unwrap_err();
            assert_eq!(err.code(), QueryErrorCode::ProtectedAttribute);
        }
    }

    #[test]
    fn test_for_record_reads_version() {
        let mut record = StorageRecord::new("USER#1", "PROFILE", "USER", at());
        record.touch(at());
        let update = VersionedUpdate::for_record(&record, at());
        assert_eq!(update.next_version(), 3);
    }
}
