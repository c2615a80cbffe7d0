//! Mapping interpreter: one source row to one candidate record
//!
//! Stages, in order: field mappings, transformations, key rules and
//! filters. Key rules read the source row, except registry patterns,
//! which read the mapped record so a key always agrees with the stored
//! attribute it indexes. A row that fails a filter is skipped, not
//! rejected.

use serde_json::{Map, Value};
use thiserror::Error;

use super::mapping::{
    FieldMapping, FieldTransform, FilterRule, KeyRule, MigrationMapping, Transformation,
};
use crate::document::{get_path, is_truthy, parse_timestamp, set_path};
use crate::keys::{iso_timestamp, segment, KeyAttr};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("{attr} requires source field {field}")]
    MissingKeyField { attr: &'static str, field: String },

    #[error("{field} is not a usable key value")]
    InvalidKeyValue { field: String },

    #[error("{field} is not a valid date: {value}")]
    InvalidDate { field: String, value: String },

    #[error("{field} does not hold valid JSON: {message}")]
    InvalidJson { field: String, message: String },
}

/// Result of mapping one row
#[derive(Debug, Clone, PartialEq)]
pub enum Transformed {
    /// Candidate record, not yet validated
    Record(Value),
    /// Dropped by a filter
    Filtered,
}

/// Maps `row` through `mapping`. `run_timestamp` stands in for every
/// missing timestamp so keys and attributes derived in one run agree.
pub fn transform_row(
    row: &Value,
    mapping: &MigrationMapping,
    run_timestamp: &str,
) -> Result<Transformed, TransformError> {
    let mut record = Map::new();

    for field in &mapping.field_mapping {
        if let Some(value) = eval_field(&field.mapping, row)? {
            set_path(&mut record, &field.target, value);
        }
    }

    for rule in &mapping.transformations {
        let current = get_path_in(&record, &rule.field).cloned();
        let next = apply_transformation(rule.transform, &rule.field, current, run_timestamp)?;
        if let Some(next) = next {
            set_path(&mut record, &rule.field, next);
        }
    }

    let keys = mapping
        .key_mapping
        .rules()
        .into_iter()
        .map(|(attr, rule)| Ok((attr, eval_key(rule, row, &record, attr, run_timestamp)?)))
        .collect::<Result<Vec<_>, TransformError>>()?;
    for (attr, key) in keys {
        record.insert(attr.name().to_string(), Value::String(key));
    }

    let record = Value::Object(record);
    let keep = mapping
        .filters
        .iter()
        .all(|filter| passes(&filter.rule, get_path(&record, &filter.field)));

    Ok(if keep {
        Transformed::Record(record)
    } else {
        Transformed::Filtered
    })
}

fn get_path_in<'a>(record: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    let value = record.get(head)?;
    match rest {
        Some(rest) => get_path(value, rest),
        None => Some(value),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn with_prefix(prefix: &str, value: &str) -> String {
    if prefix.is_empty() {
        segment::escape_value(value)
    } else {
        segment::segment(prefix, value)
    }
}

fn eval_key(
    rule: &KeyRule,
    row: &Value,
    record: &Map<String, Value>,
    attr: KeyAttr,
    run_timestamp: &str,
) -> Result<String, TransformError> {
    match rule {
        KeyRule::Fixed(token) => Ok(token.clone()),
        KeyRule::Template {
            prefix,
            field,
            default,
        } => {
            let value = row.get(field.as_str()).filter(|v| !v.is_null());
            let text = match (value, default) {
                (Some(v), Some(default)) if !is_truthy(Some(v)) => default.clone(),
                (Some(v), _) => scalar_text(v).ok_or_else(|| TransformError::InvalidKeyValue {
                    field: field.clone(),
                })?,
                (None, Some(default)) => default.clone(),
                (None, None) => {
                    return Err(TransformError::MissingKeyField {
                        attr: attr.name(),
                        field: field.clone(),
                    })
                }
            };
            Ok(with_prefix(prefix, &text))
        }
        KeyRule::Timestamp { prefix, field } => {
            let ts = normalize_date(field, row.get(field.as_str()))?
                .unwrap_or_else(|| run_timestamp.to_string());
            Ok(with_prefix(prefix, &ts))
        }
        KeyRule::Pattern { pattern, path } => {
            let value = match get_path_in(record, path) {
                None | Some(Value::Null) => {
                    return Err(TransformError::MissingKeyField {
                        attr: attr.name(),
                        field: path.clone(),
                    })
                }
                Some(value) => value,
            };
            let invalid = || TransformError::InvalidKeyValue { field: path.clone() };
            let text = scalar_text(value).ok_or_else(invalid)?;
            pattern
                .apply(&text)
                .get(pattern.slot())
                .map(str::to_string)
                .ok_or_else(invalid)
        }
        KeyRule::Join(parts) => {
            let parts = parts
                .iter()
                .map(|part| eval_key(part, row, record, attr, run_timestamp))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(parts.join("#"))
        }
    }
}

/// Canonical timestamp of a truthy value; `None` when empty
fn normalize_date(field: &str, value: Option<&Value>) -> Result<Option<String>, TransformError> {
    if !is_truthy(value) {
        return Ok(None);
    }
    let value = value.cloned().unwrap_or(Value::Null);
    parse_timestamp(&value)
        .map(|dt| Some(iso_timestamp(dt)))
        .ok_or_else(|| TransformError::InvalidDate {
            field: field.to_string(),
            value: value.to_string(),
        })
}

/// Parses a JSON-encoded column. Already-structured values pass through.
fn decode_json(field: &str, value: Option<&Value>, empty: Value) -> Result<Value, TransformError> {
    match value {
        v if !is_truthy(v) => Ok(empty),
        Some(Value::String(s)) => serde_json::from_str(s).map_err(|e| TransformError::InvalidJson {
            field: field.to_string(),
            message: e.to_string(),
        }),
        Some(other) => Ok(other.clone()),
        None => Ok(empty),
    }
}

fn eval_field(mapping: &FieldMapping, row: &Value) -> Result<Option<Value>, TransformError> {
    let value = match mapping {
        FieldMapping::Source(name) => match row.get(name) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value.clone()),
        },
        FieldMapping::Default(value) => Some(value.clone()),
        FieldMapping::Transform(transform) => match transform {
            FieldTransform::JsonArray(f) => Some(decode_json(f, row.get(f), Value::Array(Vec::new()))?),
            FieldTransform::JsonObject(f) => Some(decode_json(f, row.get(f), Value::Object(Map::new()))?),
            FieldTransform::BoolDefaultTrue(f) => {
                Some(Value::Bool(row.get(f) != Some(&Value::Bool(false))))
            }
            FieldTransform::BoolStrictTrue(f) => {
                Some(Value::Bool(row.get(f) == Some(&Value::Bool(true))))
            }
            FieldTransform::OrDefault { field, value } => Some(if is_truthy(row.get(field)) {
                row.get(field).cloned().unwrap_or(Value::Null)
            } else {
                value.clone()
            }),
            FieldTransform::OrZero(f) => Some(if is_truthy(row.get(f)) {
                row.get(f).cloned().unwrap_or(Value::Null)
            } else {
                Value::from(0)
            }),
            FieldTransform::IsoDate(f) => normalize_date(f, row.get(f))?.map(Value::String),
            FieldTransform::Choose {
                field,
                when_true,
                when_false,
            } => Some(if is_truthy(row.get(field)) {
                when_true.clone()
            } else {
                when_false.clone()
            }),
            FieldTransform::ChooseDefaultTrue {
                field,
                when_true,
                when_false,
            } => Some(if row.get(field) == Some(&Value::Bool(false)) {
                when_false.clone()
            } else {
                when_true.clone()
            }),
        },
    };
    Ok(value)
}

fn apply_transformation(
    transform: Transformation,
    field: &str,
    current: Option<Value>,
    run_timestamp: &str,
) -> Result<Option<Value>, TransformError> {
    Ok(match transform {
        Transformation::NormalizeIsoDate => Some(Value::String(
            normalize_date(field, current.as_ref())?.unwrap_or_else(|| run_timestamp.to_string()),
        )),
        Transformation::Trim => match current {
            Some(Value::String(s)) => Some(Value::String(s.trim().to_string())),
            _ => None,
        },
        Transformation::Lowercase => match current {
            Some(Value::String(s)) => Some(Value::String(s.to_lowercase())),
            _ => None,
        },
    })
}

fn passes(rule: &FilterRule, value: Option<&Value>) -> bool {
    match rule {
        FilterRule::NotEmpty => match value {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(Value::Object(o)) => !o.is_empty(),
            Some(_) => true,
        },
        FilterRule::Equals(expected) => value == Some(expected),
        FilterRule::NotEquals(expected) => value != Some(expected),
        FilterRule::Truthy => is_truthy(value),
    }
}
