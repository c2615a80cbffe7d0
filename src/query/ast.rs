//! Condition structures accumulated by the builder

use serde_json::Value;

/// Comparison operators of key and filter conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Between,
    In,
    BeginsWith,
    /// Filter only
    Contains,
    /// Filter only
    Exists,
    /// Filter only
    NotExists,
}

impl Operator {
    /// Operator name as written in error messages and explain output
    pub fn name(&self) -> &'static str {
        match self {
            Operator::Eq => "EQ",
            Operator::Ne => "NE",
            Operator::Lt => "LT",
            Operator::Le => "LE",
            Operator::Gt => "GT",
            Operator::Ge => "GE",
            Operator::Between => "BETWEEN",
            Operator::In => "IN",
            Operator::BeginsWith => "BEGINS_WITH",
            Operator::Contains => "CONTAINS",
            Operator::Exists => "EXISTS",
            Operator::NotExists => "NOT_EXISTS",
        }
    }

    /// Returns true if the operator may appear in a key condition
    pub fn allowed_in_key(&self) -> bool {
        !matches!(
            self,
            Operator::Contains | Operator::Exists | Operator::NotExists
        )
    }

    /// Returns true for operators that take no operand
    pub fn is_unary(&self) -> bool {
        matches!(self, Operator::Exists | Operator::NotExists)
    }

    /// Returns true for operators that take exactly one value
    pub fn is_scalar(&self) -> bool {
        !self.is_unary() && !matches!(self, Operator::Between | Operator::In)
    }

    /// Infix symbol for plain comparisons
    pub(crate) fn symbol(&self) -> Option<&'static str> {
        match self {
            Operator::Eq => Some("="),
            Operator::Ne => Some("<>"),
            Operator::Lt => Some("<"),
            Operator::Le => Some("<="),
            Operator::Gt => Some(">"),
            Operator::Ge => Some(">="),
            _ => None,
        }
    }
}

/// Right-hand side of a condition
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// EXISTS / NOT_EXISTS
    None,
    Value(Value),
    /// BETWEEN (two values) and IN (one or more)
    List(Vec<Value>),
}

impl Operand {
    pub fn value(value: impl Into<Value>) -> Self {
        Operand::Value(value.into())
    }

    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Operand::List(values.into_iter().map(Into::into).collect())
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Operand::None => "no operand".to_string(),
            Operand::Value(_) => "a single value".to_string(),
            Operand::List(values) => format!("{} values", values.len()),
        }
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Value(value)
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Operand::Value(Value::String(value.to_string()))
    }
}

impl From<String> for Operand {
    fn from(value: String) -> Self {
        Operand::Value(Value::String(value))
    }
}

impl From<Vec<Value>> for Operand {
    fn from(values: Vec<Value>) -> Self {
        Operand::List(values)
    }
}

/// One accumulated condition
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub attribute: String,
    pub op: Operator,
    pub operand: Operand,
}

impl Condition {
    pub fn new(attribute: impl Into<String>, op: Operator, operand: Operand) -> Self {
        Self {
            attribute: attribute.into(),
            op,
            operand,
        }
    }
}

/// Which expression a condition belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    Key,
    Filter,
}

impl ConditionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionKind::Key => "key",
            ConditionKind::Filter => "filter",
        }
    }
}
