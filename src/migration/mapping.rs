//! Declarative migration mappings
//!
//! A mapping describes, as plain data, how one legacy row becomes one
//! single-table record: which key tuple it occupies, where each target
//! attribute comes from, which normalizations run and which rows are
//! dropped. Mappings serialize to JSON, so plans can be inspected
//! and stored.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::errors::{MigrationError, Result};
use super::source::SourceTarget;
use crate::keys::{KeyAttr, KeyAttributes, KeyPatterns};
use crate::validation::FieldRule;

/// Single-value index patterns of the key registry. A mapping applies
/// one to a mapped attribute, so migrated records land in the same index
/// partitions as records written through the typed entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyPattern {
    CirclesByType,
    CirclesByStatus,
    StoriesByAuthor,
    StoriesByStatus,
    BusinessesByCategory,
    BusinessesByStatus,
    ResourcesByType,
    ResourcesByCategory,
    ResourcesByStatus,
}

impl KeyPattern {
    pub fn apply(self, value: &str) -> KeyAttributes {
        match self {
            KeyPattern::CirclesByType => KeyPatterns::circles_by_type(value),
            KeyPattern::CirclesByStatus => KeyPatterns::circles_by_status(value),
            KeyPattern::StoriesByAuthor => KeyPatterns::stories_by_author(value),
            KeyPattern::StoriesByStatus => KeyPatterns::stories_by_status(value),
            KeyPattern::BusinessesByCategory => KeyPatterns::businesses_by_category(value),
            KeyPattern::BusinessesByStatus => KeyPatterns::businesses_by_status(value),
            KeyPattern::ResourcesByType => KeyPatterns::resources_by_type(value),
            KeyPattern::ResourcesByCategory => KeyPatterns::resources_by_category(value),
            KeyPattern::ResourcesByStatus => KeyPatterns::resources_by_status(value),
        }
    }

    /// The slot the pattern writes
    pub fn slot(self) -> KeyAttr {
        match self {
            KeyPattern::CirclesByType
            | KeyPattern::StoriesByAuthor
            | KeyPattern::BusinessesByCategory
            | KeyPattern::ResourcesByType => KeyAttr::Gsi1Pk,
            KeyPattern::ResourcesByCategory => KeyAttr::Gsi2Pk,
            KeyPattern::CirclesByStatus
            | KeyPattern::StoriesByStatus
            | KeyPattern::BusinessesByStatus
            | KeyPattern::ResourcesByStatus => KeyAttr::Gsi3Pk,
        }
    }
}

/// Derives one key attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyRule {
    /// Literal token such as `PROFILE`
    Fixed(String),
    /// `PREFIX#<row[field]>`. `default` replaces an empty value; without
    /// one only an absent or null field is an error. An empty prefix
    /// yields the bare value.
    Template {
        prefix: String,
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },
    /// `PREFIX#<timestamp>` from `row[field]`, normalized; the run
    /// timestamp when the field is empty
    Timestamp { prefix: String, field: String },
    /// Registry pattern applied to the mapped attribute at `path`
    Pattern { pattern: KeyPattern, path: String },
    /// Parts joined with `#`
    Join(Vec<KeyRule>),
}

impl KeyRule {
    pub fn fixed(token: &str) -> Self {
        KeyRule::Fixed(token.to_string())
    }

    pub fn field(prefix: &str, field: &str) -> Self {
        KeyRule::Template {
            prefix: prefix.to_string(),
            field: field.to_string(),
            default: None,
        }
    }

    pub fn field_or(prefix: &str, field: &str, default: &str) -> Self {
        KeyRule::Template {
            prefix: prefix.to_string(),
            field: field.to_string(),
            default: Some(default.to_string()),
        }
    }

    /// `CREATED#<ts>`
    pub fn created(field: &str) -> Self {
        KeyRule::Timestamp {
            prefix: "CREATED".to_string(),
            field: field.to_string(),
        }
    }

    /// `UPDATED#<ts>`
    pub fn updated(field: &str) -> Self {
        KeyRule::Timestamp {
            prefix: "UPDATED".to_string(),
            field: field.to_string(),
        }
    }

    pub fn pattern(pattern: KeyPattern, path: &str) -> Self {
        KeyRule::Pattern {
            pattern,
            path: path.to_string(),
        }
    }

    /// `TENANT#<tenantId|default>#<FAMILY>`
    pub fn tenant(family: &str) -> Self {
        KeyRule::Join(vec![
            KeyRule::field_or("TENANT", "tenantId", crate::entity::DEFAULT_TENANT),
            KeyRule::fixed(family),
        ])
    }
}

/// Key rules for every slot; primary key rules are mandatory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMapping {
    pub pk: KeyRule,
    pub sk: KeyRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gsi1pk: Option<KeyRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gsi1sk: Option<KeyRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gsi2pk: Option<KeyRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gsi2sk: Option<KeyRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gsi3pk: Option<KeyRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gsi3sk: Option<KeyRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gsi4pk: Option<KeyRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gsi4sk: Option<KeyRule>,
}

impl KeyMapping {
    pub fn new(pk: KeyRule, sk: KeyRule) -> Self {
        Self {
            pk,
            sk,
            gsi1pk: None,
            gsi1sk: None,
            gsi2pk: None,
            gsi2sk: None,
            gsi3pk: None,
            gsi3sk: None,
            gsi4pk: None,
            gsi4sk: None,
        }
    }

    /// Sets a secondary slot; primary slots are fixed by [`KeyMapping::new`]
    pub fn with(mut self, attr: KeyAttr, rule: KeyRule) -> Self {
        match attr {
            KeyAttr::Pk => self.pk = rule,
            KeyAttr::Sk => self.sk = rule,
            KeyAttr::Gsi1Pk => self.gsi1pk = Some(rule),
            KeyAttr::Gsi1Sk => self.gsi1sk = Some(rule),
            KeyAttr::Gsi2Pk => self.gsi2pk = Some(rule),
            KeyAttr::Gsi2Sk => self.gsi2sk = Some(rule),
            KeyAttr::Gsi3Pk => self.gsi3pk = Some(rule),
            KeyAttr::Gsi3Sk => self.gsi3sk = Some(rule),
            KeyAttr::Gsi4Pk => self.gsi4pk = Some(rule),
            KeyAttr::Gsi4Sk => self.gsi4sk = Some(rule),
        }
        self
    }

    /// Puts `pattern`, applied to the mapped attribute at `path`, in the
    /// slot the pattern writes
    pub fn pattern(self, pattern: KeyPattern, path: &str) -> Self {
        self.with(pattern.slot(), KeyRule::pattern(pattern, path))
    }

    /// Populated slots in table order
    pub fn rules(&self) -> Vec<(KeyAttr, &KeyRule)> {
        let slots = [
            (KeyAttr::Pk, Some(&self.pk)),
            (KeyAttr::Sk, Some(&self.sk)),
            (KeyAttr::Gsi1Pk, self.gsi1pk.as_ref()),
            (KeyAttr::Gsi1Sk, self.gsi1sk.as_ref()),
            (KeyAttr::Gsi2Pk, self.gsi2pk.as_ref()),
            (KeyAttr::Gsi2Sk, self.gsi2sk.as_ref()),
            (KeyAttr::Gsi3Pk, self.gsi3pk.as_ref()),
            (KeyAttr::Gsi3Sk, self.gsi3sk.as_ref()),
            (KeyAttr::Gsi4Pk, self.gsi4pk.as_ref()),
            (KeyAttr::Gsi4Sk, self.gsi4sk.as_ref()),
        ];
        slots
            .into_iter()
            .filter_map(|(attr, rule)| rule.map(|rule| (attr, rule)))
            .collect()
    }
}

/// Derived values computed from a source row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldTransform {
    /// JSON-encoded array column, `[]` when empty
    JsonArray(String),
    /// JSON-encoded object column, `{}` when empty
    JsonObject(String),
    /// `false` only when the column is exactly `false`
    BoolDefaultTrue(String),
    /// `true` only when the column is exactly `true`
    BoolStrictTrue(String),
    /// Column value, or `value` when empty
    OrDefault { field: String, value: Value },
    /// Column value, or `0` when empty
    OrZero(String),
    /// Normalized timestamp; omitted when empty
    IsoDate(String),
    /// `when_true` or `when_false` on the column's truthiness
    Choose {
        field: String,
        #[serde(rename = "whenTrue")]
        when_true: Value,
        #[serde(rename = "whenFalse")]
        when_false: Value,
    },
    /// `when_false` only when the column is exactly `false`; agrees with
    /// `BoolDefaultTrue` on the same column
    ChooseDefaultTrue {
        field: String,
        #[serde(rename = "whenTrue")]
        when_true: Value,
        #[serde(rename = "whenFalse")]
        when_false: Value,
    },
}

/// Source of one target attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldMapping {
    /// Copy a source column; omitted when absent or null
    Source(String),
    Transform(FieldTransform),
    /// Constant value
    Default(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMap {
    /// Dot path of the target attribute
    pub target: String,
    pub mapping: FieldMapping,
}

/// Post-mapping normalizations of a target attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Transformation {
    /// Any recognised date format to canonical form; missing becomes the
    /// run timestamp
    NormalizeIsoDate,
    Trim,
    Lowercase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationRule {
    pub field: String,
    pub transform: Transformation,
}

/// Keep-conditions evaluated against the mapped record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterRule {
    /// Present and not an empty string, array or object
    NotEmpty,
    Equals(Value),
    NotEquals(Value),
    Truthy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub rule: FilterRule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationMapping {
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_query: Option<String>,
    pub key_mapping: KeyMapping,
    #[serde(default)]
    pub field_mapping: Vec<FieldMap>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transformations: Vec<TransformationRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<FieldRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
}

impl MigrationMapping {
    pub fn new(entity_type: &str, source_table: &str, key_mapping: KeyMapping) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            source_table: Some(source_table.to_string()),
            source_query: None,
            key_mapping,
            field_mapping: Vec::new(),
            transformations: Vec::new(),
            validation: Vec::new(),
            filters: Vec::new(),
        }
    }

    pub fn map(mut self, target: &str, mapping: FieldMapping) -> Self {
        self.field_mapping.push(FieldMap {
            target: target.to_string(),
            mapping,
        });
        self
    }

    /// Copies source column `field` to `target`
    pub fn copy(self, target: &str, field: &str) -> Self {
        self.map(target, FieldMapping::Source(field.to_string()))
    }

    pub fn derive(self, target: &str, transform: FieldTransform) -> Self {
        self.map(target, FieldMapping::Transform(transform))
    }

    pub fn constant(self, target: &str, value: impl Into<Value>) -> Self {
        self.map(target, FieldMapping::Default(value.into()))
    }

    pub fn transform(mut self, field: &str, transform: Transformation) -> Self {
        self.transformations.push(TransformationRule {
            field: field.to_string(),
            transform,
        });
        self
    }

    pub fn filter(mut self, field: &str, rule: FilterRule) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            rule,
        });
        self
    }

    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.validation.push(rule);
        self
    }

    /// Where rows are read from; a query wins over a table
    pub fn source_target(&self) -> Result<SourceTarget> {
        match (&self.source_query, &self.source_table) {
            (Some(query), _) => Ok(SourceTarget::Query(query.clone())),
            (None, Some(table)) => Ok(SourceTarget::Table(table.clone())),
            (None, None) => Err(MigrationError::Config(format!(
                "No source table or query specified for {}",
                self.entity_type
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationPlan {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub version: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub entities: Vec<MigrationMapping>,
    /// Extra rules per entity type, applied after the built-in validators
    #[serde(default)]
    pub validation_rules: BTreeMap<String, Vec<FieldRule>>,
}

impl MigrationPlan {
    /// Rules for `mapping`: its own followed by the plan's
    pub fn rules_for(&self, mapping: &MigrationMapping) -> Vec<FieldRule> {
        let mut rules = mapping.validation.clone();
        if let Some(extra) = self.validation_rules.get(&mapping.entity_type) {
            rules.extend(extra.iter().cloned());
        }
        rules
    }

    /// Rejects plans that cannot run: no entities, missing sources,
    /// duplicate entity types, key patterns in the wrong slot or
    /// uncompilable rule patterns
    pub fn validate(&self) -> Result<()> {
        if self.entities.is_empty() {
            return Err(MigrationError::Config(format!(
                "plan '{}' has no entities",
                self.name
            )));
        }

        let mut seen = std::collections::BTreeSet::new();
        for mapping in &self.entities {
            if !seen.insert(mapping.entity_type.as_str()) {
                return Err(MigrationError::Config(format!(
                    "entity type {} is mapped twice",
                    mapping.entity_type
                )));
            }
            mapping.source_target()?;

            for (attr, rule) in mapping.key_mapping.rules() {
                if let KeyRule::Pattern { pattern, .. } = rule {
                    if pattern.slot() != attr {
                        return Err(MigrationError::Config(format!(
                            "{} key {} cannot hold pattern {:?}",
                            mapping.entity_type,
                            attr.name(),
                            pattern
                        )));
                    }
                }
            }

            for rule in self.rules_for(mapping) {
                if let Err(e) = rule.compiled_pattern() {
                    return Err(MigrationError::Config(format!(
                        "invalid pattern for {}.{}: {}",
                        mapping.entity_type, rule.field, e
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let plan: MigrationPlan = serde_json::from_str(json)?;
        plan.validate()?;
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users() -> MigrationMapping {
        MigrationMapping::new(
            "USER",
            "users",
            KeyMapping::new(KeyRule::field("USER", "id"), KeyRule::fixed("PROFILE"))
                .with(KeyAttr::Gsi4Pk, KeyRule::tenant("USERS")),
        )
        .copy("userId", "id")
        .constant("version", 1)
    }

    #[test]
    fn test_key_rules_in_table_order() {
        let mapping = users();
        let attrs: Vec<KeyAttr> = mapping.key_mapping.rules().iter().map(|(a, _)| *a).collect();
        assert_eq!(attrs, vec![KeyAttr::Pk, KeyAttr::Sk, KeyAttr::Gsi4Pk]);
    }

    #[test]
    fn test_mapping_json_shape() {
        let value = serde_json::to_value(users()).unwrap();
        assert_eq!(value["entityType"], "USER");
        assert_eq!(value["keyMapping"]["sk"], json!({"fixed": "PROFILE"}));
        assert_eq!(
            value["keyMapping"]["pk"],
            json!({"template": {"prefix": "USER", "field": "id"}})
        );
        assert_eq!(
            value["fieldMapping"][0],
            json!({"target": "userId", "mapping": {"source": "id"}})
        );
        assert!(value.get("filters").is_none());

        let back: MigrationMapping = serde_json::from_value(value).unwrap();
        assert_eq!(back, users());
    }

    #[test]
    fn test_source_target() {
        let mut mapping = users();
        assert_eq!(
            mapping.source_target().unwrap(),
            SourceTarget::Table("users".into())
        );
        mapping.source_query = Some("active_users".into());
        assert_eq!(
            mapping.source_target().unwrap(),
            SourceTarget::Query("active_users".into())
        );
        mapping.source_query = None;
        mapping.source_table = None;
        assert!(matches!(mapping.source_target(), Err(MigrationError::Config(_))));
    }

    #[test]
    fn test_plan_validation() {
        let plan = MigrationPlan {
            name: "test".into(),
            description: String::new(),
            version: "1.0.0".into(),
            dependencies: vec![],
            entities: vec![users(), users()],
            validation_rules: BTreeMap::new(),
        };
        assert!(plan.validate().unwrap_err().to_string().contains("mapped twice"));

        let mut plan = MigrationPlan { entities: vec![users()], ..plan };
        assert!(plan.validate().is_ok());

        plan.validation_rules
            .insert("USER".into(), vec![FieldRule::new("email").pattern("(")]);
        assert!(plan.validate().unwrap_err().to_string().contains("invalid pattern"));
    }

    #[test]
    fn test_pattern_rule_slot() {
        let keys = KeyMapping::new(KeyRule::field("STORY", "id"), KeyRule::fixed("METADATA"))
            .pattern(KeyPattern::StoriesByStatus, "status");
        assert_eq!(
            keys.gsi3pk,
            Some(KeyRule::pattern(KeyPattern::StoriesByStatus, "status"))
        );
        assert_eq!(
            serde_json::to_value(&keys.gsi3pk).unwrap(),
            json!({"pattern": {"pattern": "storiesByStatus", "path": "status"}})
        );

        let misplaced = users().key_mapping.with(
            KeyAttr::Gsi1Pk,
            KeyRule::pattern(KeyPattern::StoriesByStatus, "status"),
        );
        let plan = MigrationPlan {
            name: "test".into(),
            description: String::new(),
            version: "1.0.0".into(),
            dependencies: vec![],
            entities: vec![MigrationMapping {
                key_mapping: misplaced,
                ..users()
            }],
            validation_rules: BTreeMap::new(),
        };
        assert!(plan.validate().unwrap_err().to_string().contains("cannot hold pattern"));
    }

    #[test]
    fn test_rules_for_combines_sources() {
        let mut rules = BTreeMap::new();
        rules.insert("USER".to_string(), vec![FieldRule::new("email").required()]);
        let mapping = users().rule(FieldRule::new("userId").required());
        let plan = MigrationPlan {
            name: "test".into(),
            description: String::new(),
            version: "1.0.0".into(),
            dependencies: vec![],
            entities: vec![mapping.clone()],
            validation_rules: rules,
        };
        let fields: Vec<String> = plan.rules_for(&mapping).into_iter().map(|r| r.field).collect();
        assert_eq!(fields, vec!["userId", "email"]);
    }
}
