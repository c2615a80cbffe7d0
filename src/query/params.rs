//! Compiled query parameters and placeholder allocation

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Output of [`super::QueryBuilder::build`]. Unset fields are omitted
/// when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_condition_expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection_expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression_attribute_names: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression_attribute_values: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_start_key: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consistent_read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_index_forward: Option<bool>,
}

/// Per-build placeholder allocator.
///
/// Every attribute name goes through `#attrN` and every literal through
/// `:valN`, so caller input never reaches an expression string. A repeated
/// attribute reuses its placeholder.
#[derive(Debug, Default)]
pub(crate) struct Placeholders {
    names: BTreeMap<String, String>,
    by_attribute: HashMap<String, String>,
    values: BTreeMap<String, Value>,
    value_counter: usize,
}

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&mut self, attribute: &str) -> String {
        if let Some(existing) = self.by_attribute.get(attribute) {
            return existing.clone();
        }
        let placeholder = format!("#attr{}", self.by_attribute.len());
        self.by_attribute
            .insert(attribute.to_string(), placeholder.clone());
        self.names.insert(placeholder.clone(), attribute.to_string());
        placeholder
    }

    pub fn value(&mut self, value: Value) -> String {
        let placeholder = format!(":val{}", self.value_counter);
        self.value_counter += 1;
        self.values.insert(placeholder.clone(), value);
        placeholder
    }

    /// Binds an attribute under a caller-chosen placeholder outside the
    /// `#attrN` sequence
    pub fn named_name(&mut self, placeholder: &str, attribute: &str) {
        self.names
            .insert(placeholder.to_string(), attribute.to_string());
    }

    /// Binds a value under a caller-chosen placeholder
    pub fn named_value(&mut self, placeholder: &str, value: Value) {
        self.values.insert(placeholder.to_string(), value);
    }

    /// Names and values maps, each present only if non-empty
    pub fn finish(
        self,
    ) -> (
        Option<BTreeMap<String, String>>,
        Option<BTreeMap<String, Value>>,
    ) {
        let names = (!self.names.is_empty()).then_some(self.names);
        let values = (!self.values.is_empty()).then_some(self.values);
        (names, values)
    }
}
