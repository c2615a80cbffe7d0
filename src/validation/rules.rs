//! Declarative field rules
//!
//! Migration plans attach a list of `FieldRule`s per entity type. Rules are
//! data, so a plan can be loaded from JSON and checked before it runs.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::report::{IssueCode, ValidationReport};
use crate::document::{get_path, parse_timestamp, str_len};

/// Expected JSON shape of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Array,
    Object,
    /// A string or epoch-millis number that parses as a timestamp
    Date,
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Date => "date",
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Array => value.is_array(),
            FieldType::Object => value.is_object(),
            FieldType::Date => parse_timestamp(value).is_some(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRule {
    /// Dot path of the checked field
    pub field: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Value>>,
}

impl FieldRule {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ..Self::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn of_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Compiles the pattern, if any
    pub fn compiled_pattern(&self) -> Result<Option<Regex>, regex::Error> {
        self.pattern.as_deref().map(Regex::new).transpose()
    }

    /// Checks `document` against this rule, appending issues to `report`.
    /// Absent optional fields are skipped.
    pub fn apply(&self, document: &Value, report: &mut ValidationReport) {
        let field = self.field.as_str();
        let value = get_path(document, field);

        let value = match value {
            None | Some(Value::Null) => {
                if self.required {
                    report.error(field, &format!("{} is required", field), IssueCode::Required);
                }
                return;
            }
            Some(Value::String(s)) if s.is_empty() && self.required => {
                report.error(field, &format!("{} is required", field), IssueCode::Required);
                return;
            }
            Some(value) => value,
        };

        if let Some(field_type) = self.field_type {
            if !field_type.matches(value) {
                report.error_with(
                    field,
                    &format!("{} must be of type {}", field, field_type.name()),
                    IssueCode::TypeError,
                    value.clone(),
                );
                return;
            }
        }

        if let Some(len) = str_len(value) {
            if let Some(min) = self.min_length.filter(|min| len < *min) {
                report.error_with(
                    field,
                    &format!("{} must be at least {} characters", field, min),
                    IssueCode::MinLength,
                    len,
                );
            }
            if let Some(max) = self.max_length.filter(|max| len > *max) {
                report.error_with(
                    field,
                    &format!("{} must be at most {} characters", field, max),
                    IssueCode::MaxLength,
                    len,
                );
            }
        }

        match self.compiled_pattern() {
            Ok(Some(re)) => {
                if !value.as_str().is_some_and(|s| re.is_match(s)) {
                    report.error_with(
                        field,
                        &format!("{} does not match the required pattern", field),
                        IssueCode::InvalidFormat,
                        value.clone(),
                    );
                }
            }
            Ok(None) => {}
            Err(_) => report.error(
                field,
                &format!("Pattern for {} is not a valid expression", field),
                IssueCode::InvalidFormat,
            ),
        }

        if let Some(allowed) = &self.allowed {
            if !allowed.contains(value) {
                report.error_with(
                    field,
                    &format!("{} must be one of the allowed values", field),
                    IssueCode::InvalidValue,
                    value.clone(),
                );
            }
        }
    }
}

/// Applies every rule to `document`
pub fn apply_rules(rules: &[FieldRule], document: &Value) -> ValidationReport {
    let mut report = ValidationReport::new();
    for rule in rules {
        rule.apply(document, &mut report);
    }
    report
}
