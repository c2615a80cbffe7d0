//! Fluent expression builder
//!
//! Conditions are accumulated as data and compiled in one pass by
//! [`QueryBuilder::build`], which consumes the builder. Contract
//! violations surface there as [`QueryError`].

use serde_json::{Map, Value};

use super::ast::{Condition, ConditionKind, Operand, Operator};
use super::errors::{QueryError, QueryResult};
use super::params::{Placeholders, QueryParams};
use crate::keys::{Index, KeyAttributes};

/// Sort direction over the range key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    key_conditions: Vec<Condition>,
    filter_conditions: Vec<Condition>,
    sort: Vec<(String, SortDirection)>,
    projection: Vec<String>,
    index_name: Option<String>,
    limit: Option<u32>,
    exclusive_start_key: Option<Map<String, Value>>,
    consistent_read: Option<bool>,
    scan_index_forward: Option<bool>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a partition or sort key condition
    pub fn key_condition(
        mut self,
        attribute: impl Into<String>,
        op: Operator,
        operand: impl Into<Operand>,
    ) -> Self {
        self.key_conditions
            .push(Condition::new(attribute, op, operand.into()));
        self
    }

    /// Adds a condition applied after the key lookup
    pub fn filter_condition(
        mut self,
        attribute: impl Into<String>,
        op: Operator,
        operand: impl Into<Operand>,
    ) -> Self {
        self.filter_conditions
            .push(Condition::new(attribute, op, operand.into()));
        self
    }

    pub fn partition_key(self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.key_condition(attribute, Operator::Eq, Operand::value(value))
    }

    pub fn sort_key(
        self,
        attribute: impl Into<String>,
        op: Operator,
        operand: impl Into<Operand>,
    ) -> Self {
        self.key_condition(attribute, op, operand)
    }

    /// Sort key prefix match
    pub fn begins_with(self, attribute: impl Into<String>, prefix: impl Into<String>) -> Self {
        let prefix = Value::String(prefix.into());
        self.key_condition(attribute, Operator::BeginsWith, Operand::Value(prefix))
    }

    /// Inclusive sort key range
    pub fn between(
        self,
        attribute: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        self.key_condition(
            attribute,
            Operator::Between,
            Operand::List(vec![low.into(), high.into()]),
        )
    }

    pub fn contains(self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter_condition(attribute, Operator::Contains, Operand::value(value))
    }

    pub fn in_list<I, V>(self, attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.filter_condition(attribute, Operator::In, Operand::list(values))
    }

    pub fn exists(self, attribute: impl Into<String>) -> Self {
        self.filter_condition(attribute, Operator::Exists, Operand::None)
    }

    pub fn not_exists(self, attribute: impl Into<String>) -> Self {
        self.filter_condition(attribute, Operator::NotExists, Operand::None)
    }

    /// Replaces the projection list
    pub fn project<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = attributes.into_iter().map(Into::into).collect();
        self
    }

    pub fn use_index(mut self, index: impl Into<String>) -> Self {
        self.index_name = Some(index.into());
        self
    }

    /// Targets one of the table's secondary indexes
    pub fn on_index(self, index: Index) -> Self {
        self.use_index(index.name())
    }

    pub fn limit(mut self, count: u32) -> Self {
        self.limit = Some(count);
        self
    }

    pub fn exclusive_start_key(mut self, key: Map<String, Value>) -> Self {
        self.exclusive_start_key = Some(key);
        self
    }

    /// Resumes from the key tuple of the last item of the previous page
    pub fn start_after(self, keys: &KeyAttributes) -> Self {
        let key = keys
            .iter()
            .map(|(attr, value)| (attr.name().to_string(), Value::String(value.to_string())))
            .collect();
        self.exclusive_start_key(key)
    }

    pub fn consistent_read(mut self, enabled: bool) -> Self {
        self.consistent_read = Some(enabled);
        self
    }

    pub fn scan_index_forward(mut self, forward: bool) -> Self {
        self.scan_index_forward = Some(forward);
        self
    }

    pub fn sort_asc(mut self, attribute: Option<&str>) -> Self {
        if let Some(attribute) = attribute {
            self.sort.push((attribute.to_string(), SortDirection::Asc));
        }
        self.scan_index_forward = Some(true);
        self
    }

    pub fn sort_desc(mut self, attribute: Option<&str>) -> Self {
        if let Some(attribute) = attribute {
            self.sort.push((attribute.to_string(), SortDirection::Desc));
        }
        self.scan_index_forward = Some(false);
        self
    }

    /// Sort directives recorded by `sort_asc` / `sort_desc`
    pub fn sort_directives(&self) -> &[(String, SortDirection)] {
        &self.sort
    }

    /// Compiles the accumulated directives.
    ///
    /// Key conditions are numbered first, then filters, then the
    /// projection.
    pub fn build(self) -> QueryResult<QueryParams> {
        if self.limit == Some(0) {
            return Err(QueryError::invalid_limit());
        }

        let mut placeholders = Placeholders::new();
        let key_condition_expression =
            compile(&self.key_conditions, ConditionKind::Key, &mut placeholders)?;
        let filter_expression =
            compile(&self.filter_conditions, ConditionKind::Filter, &mut placeholders)?;

        let projection_expression = if self.projection.is_empty() {
            None
        } else {
            let mut parts = Vec::with_capacity(self.projection.len());
            for attribute in &self.projection {
                check_attribute(attribute)?;
                parts.push(placeholders.name(attribute));
            }
            Some(parts.join(", "))
        };

        let (expression_attribute_names, expression_attribute_values) = placeholders.finish();

        Ok(QueryParams {
            key_condition_expression,
            filter_expression,
            projection_expression,
            expression_attribute_names,
            expression_attribute_values,
            index_name: self.index_name,
            limit: self.limit,
            exclusive_start_key: self.exclusive_start_key,
            consistent_read: self.consistent_read,
            scan_index_forward: self.scan_index_forward,
        })
    }
}

pub(crate) fn check_attribute(attribute: &str) -> QueryResult<()> {
    if attribute.trim().is_empty() {
        return Err(QueryError::invalid_attribute());
    }
    Ok(())
}

fn compile(
    conditions: &[Condition],
    kind: ConditionKind,
    placeholders: &mut Placeholders,
) -> QueryResult<Option<String>> {
    if conditions.is_empty() {
        return Ok(None);
    }
    let mut clauses = Vec::with_capacity(conditions.len());
    for condition in conditions {
        clauses.push(render(condition, kind, placeholders)?);
    }
    Ok(Some(clauses.join(" AND ")))
}

fn render(
    condition: &Condition,
    kind: ConditionKind,
    placeholders: &mut Placeholders,
) -> QueryResult<String> {
    let Condition {
        attribute,
        op,
        operand,
    } = condition;
    check_attribute(attribute)?;
    if kind == ConditionKind::Key && !op.allowed_in_key() {
        return Err(QueryError::unsupported_operator(kind, *op, attribute));
    }

    let bad_operand = || QueryError::invalid_operand(*op, attribute, operand);

    let clause = match (op, operand) {
        (Operator::Exists, Operand::None) => {
            format!("attribute_exists({})", placeholders.name(attribute))
        }
        (Operator::NotExists, Operand::None) => {
            format!("attribute_not_exists({})", placeholders.name(attribute))
        }
        (Operator::Between, Operand::List(values)) if values.len() == 2 => {
            let name = placeholders.name(attribute);
            let low = placeholders.value(values[0].clone());
            let high = placeholders.value(values[1].clone());
            format!("{} BETWEEN {} AND {}", name, low, high)
        }
        (Operator::In, Operand::List(values)) if !values.is_empty() => {
            let name = placeholders.name(attribute);
            let list: Vec<String> = values
                .iter()
                .map(|v| placeholders.value(v.clone()))
                .collect();
            format!("{} IN ({})", name, list.join(", "))
        }
        (Operator::BeginsWith, Operand::Value(value)) => {
            let name = placeholders.name(attribute);
            format!("begins_with({}, {})", name, placeholders.value(value.clone()))
        }
        (Operator::Contains, Operand::Value(value)) => {
            let name = placeholders.name(attribute);
            format!("contains({}, {})", name, placeholders.value(value.clone()))
        }
        (op, Operand::Value(value)) => {
            let symbol = op.symbol().ok_or_else(bad_operand)?;
            let name = placeholders.name(attribute);
            format!("{} {} {}", name, symbol, placeholders.value(value.clone()))
        }
        _ => return Err(bad_operand()),
    };
    Ok(clause)
}
