//! Expression builder error types
//!
//! Error codes:
//! - UNSUPPORTED_OPERATOR (REJECT)
//! - INVALID_OPERAND (REJECT)
//! - INVALID_ATTRIBUTE (REJECT)
//! - INVALID_LIMIT (REJECT)
//! - PROTECTED_ATTRIBUTE (REJECT)

use std::fmt;

use super::ast::{ConditionKind, Operand, Operator};

/// Builder error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorCode {
    /// Operator not allowed in this kind of condition
    UnsupportedOperator,
    /// Operand arity does not match the operator
    InvalidOperand,
    /// Empty attribute name
    InvalidAttribute,
    /// Zero limit
    InvalidLimit,
    /// Update tried to set a key or envelope attribute directly
    ProtectedAttribute,
}

impl QueryErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            QueryErrorCode::UnsupportedOperator => "UNSUPPORTED_OPERATOR",
            QueryErrorCode::InvalidOperand => "INVALID_OPERAND",
            QueryErrorCode::InvalidAttribute => "INVALID_ATTRIBUTE",
            QueryErrorCode::InvalidLimit => "INVALID_LIMIT",
            QueryErrorCode::ProtectedAttribute => "PROTECTED_ATTRIBUTE",
        }
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Contract violation detected while compiling an expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    code: QueryErrorCode,
    message: String,
    attribute: Option<String>,
}

impl QueryError {
    pub fn unsupported_operator(kind: ConditionKind, op: Operator, attribute: &str) -> Self {
        Self {
            code: QueryErrorCode::UnsupportedOperator,
            message: format!(
                "Unsupported {} condition operator: {}",
                kind.as_str(),
                op.name()
            ),
            attribute: Some(attribute.to_string()),
        }
    }

    pub fn invalid_operand(op: Operator, attribute: &str, operand: &Operand) -> Self {
        let expected = match op {
            Operator::Between => "exactly 2 values",
            Operator::In => "at least 1 value",
            Operator::Exists | Operator::NotExists => "no operand",
            _ => "a single value",
        };
        Self {
            code: QueryErrorCode::InvalidOperand,
            message: format!(
                "{} on '{}' expects {}, got {}",
                op.name(),
                attribute,
                expected,
                operand.describe()
            ),
            attribute: Some(attribute.to_string()),
        }
    }

    pub fn invalid_attribute() -> Self {
        Self {
            code: QueryErrorCode::InvalidAttribute,
            message: "Attribute name must not be empty".into(),
            attribute: None,
        }
    }

    pub fn invalid_limit() -> Self {
        Self {
            code: QueryErrorCode::InvalidLimit,
            message: "Limit must be positive".into(),
            attribute: None,
        }
    }

    pub fn protected_attribute(attribute: &str) -> Self {
        Self {
            code: QueryErrorCode::ProtectedAttribute,
            message: format!("Attribute '{}' cannot be set by an update", attribute),
            attribute: Some(attribute.to_string()),
        }
    }

    pub fn code(&self) -> QueryErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REJECT] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for QueryError {}

/// Result type for builder operations
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            QueryErrorCode::UnsupportedOperator.code(),
            "UNSUPPORTED_OPERATOR"
        );
        assert_eq!(QueryErrorCode::InvalidOperand.code(), "INVALID_OPERAND");
        assert_eq!(QueryErrorCode::InvalidLimit.code(), "INVALID_LIMIT");
    }

    #[test]
    fn test_error_display() {
        let err = QueryError::unsupported_operator(ConditionKind::Key, Operator::Contains, "tags");
        let display = format!("{}", err);
        assert!(display.contains("UNSUPPORTED_OPERATOR"));
        assert!(display.contains("CONTAINS"));
        assert_eq!(err.attribute(), Some("tags"));
    }

    #[test]
    fn test_operand_message() {
        let err = QueryError::invalid_operand(
            Operator::Between,
            "SK",
            &Operand::List(vec![serde_json::json!(1)]),
        );
        assert!(err.message().contains("exactly 2 values"));
        assert!(err.message().contains("got 1 values"));
    }
}
