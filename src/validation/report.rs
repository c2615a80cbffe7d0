//! Validation reports
//!
//! Validators never fail; they collect issues into a report. Errors make
//! the report invalid, warnings never do.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Stable issue codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    Required,
    TypeError,
    InvalidFormat,
    InvalidValue,
    MinLength,
    MaxLength,
    RangeError,
    ConsistencyError,
    EmptyBatch,
    BatchSizeExceeded,
    Recommended,
    LengthWarning,
    TypeWarning,
    FormatWarning,
    RangeWarning,
    TtlWarning,
}

impl IssueCode {
    pub fn code(&self) -> &'static str {
        match self {
            IssueCode::Required => "REQUIRED",
            IssueCode::TypeError => "TYPE_ERROR",
            IssueCode::InvalidFormat => "INVALID_FORMAT",
            IssueCode::InvalidValue => "INVALID_VALUE",
            IssueCode::MinLength => "MIN_LENGTH",
            IssueCode::MaxLength => "MAX_LENGTH",
            IssueCode::RangeError => "RANGE_ERROR",
            IssueCode::ConsistencyError => "CONSISTENCY_ERROR",
            IssueCode::EmptyBatch => "EMPTY_BATCH",
            IssueCode::BatchSizeExceeded => "BATCH_SIZE_EXCEEDED",
            IssueCode::Recommended => "RECOMMENDED",
            IssueCode::LengthWarning => "LENGTH_WARNING",
            IssueCode::TypeWarning => "TYPE_WARNING",
            IssueCode::FormatWarning => "FORMAT_WARNING",
            IssueCode::RangeWarning => "RANGE_WARNING",
            IssueCode::TtlWarning => "TTL_WARNING",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Dot path of the offending field
    pub field: String,
    pub message: String,
    pub code: IssueCode,
    /// Offending value, when useful for diagnosis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: IssueCode) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code,
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    is_valid: bool,
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// True iff no errors were recorded
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &[ValidationIssue] {
        &self.errors
    }

    pub fn warnings(&self) -> &[ValidationIssue] {
        &self.warnings
    }

    pub fn push_error(&mut self, issue: ValidationIssue) {
        self.errors.push(issue);
        self.is_valid = false;
    }

    pub fn push_warning(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }

    pub fn error(&mut self, field: &str, message: &str, code: IssueCode) {
        self.push_error(ValidationIssue::new(field, message, code));
    }

    pub fn error_with(&mut self, field: &str, message: &str, code: IssueCode, value: impl Into<Value>) {
        self.push_error(ValidationIssue::new(field, message, code).with_value(value));
    }

    pub fn warning(&mut self, field: &str, message: &str, code: IssueCode) {
        self.push_warning(ValidationIssue::new(field, message, code));
    }

    pub fn warning_with(
        &mut self,
        field: &str,
        message: &str,
        code: IssueCode,
        value: impl Into<Value>,
    ) {
        self.push_warning(ValidationIssue::new(field, message, code).with_value(value));
    }

    /// Appends every issue of `other`
    pub fn merge(&mut self, other: ValidationReport) {
        for issue in other.errors {
            self.push_error(issue);
        }
        self.warnings.extend(other.warnings);
    }

    pub fn has_code(&self, code: IssueCode) -> bool {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .any(|issue| issue.code == code)
    }

    /// Error messages joined with ", "
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|issue| issue.message.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_warnings_keep_report_valid() {
        let mut report = ValidationReport::new();
        report.warning("bio", "Bio is long", IssueCode::LengthWarning);
        assert!(report.is_valid());

        report.error("userId", "User ID is required", IssueCode::Required);
        assert!(!report.is_valid());
        assert_eq!(report.errors().len(), 1);
        assert_eq!(report.warnings().len(), 1);
    }

    #[test]
    fn test_serialized_shape() {
        let mut report = ValidationReport::new();
        report.error_with("rating", "Rating must be between 1 and 5", IssueCode::RangeError, 9);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["isValid"], json!(false));
        assert_eq!(value["errors"][0]["code"], json!("RANGE_ERROR"));
        assert_eq!(value["errors"][0]["value"], json!(9));
        assert_eq!(value["warnings"], json!([]));
    }

    #[test]
    fn test_merge_and_summary() {
        let mut a = ValidationReport::new();
        a.error("PK", "Partition key (PK) is required", IssueCode::Required);
        let mut b = ValidationReport::new();
        b.error("SK", "Sort key (SK) is required", IssueCode::Required);
        b.warning("ttl", "TTL is in the past", IssueCode::TtlWarning);

        a.merge(b);
        assert_eq!(
            a.error_summary(),
            "Partition key (PK) is required, Sort key (SK) is required"
        );
        assert!(a.has_code(IssueCode::TtlWarning));
    }
}
