//! Key segment encoding
//!
//! Segments are `TYPE#value` tokens. Values are escaped so that a `#`
//! inside an identity can never forge an extra segment:
//! `%` becomes `%25` and `#` becomes `%23`. Values without either
//! character are emitted unchanged.

use chrono::{DateTime, SecondsFormat, Utc};

/// Delimiter between segment type and value
pub const DELIMITER: char = '#';

/// Escapes a raw identity value for use inside a key segment
pub fn escape_value(value: &str) -> String {
    if !value.contains(['#', '%']) {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        match c {
            '%' => out.push_str("%25"),
            '#' => out.push_str("%23"),
            c => out.push(c),
        }
    }
    out
}

/// Reverses [`escape_value`]
pub fn unescape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if tail.starts_with("%23") {
            out.push('#');
            rest = &tail[3..];
        } else if tail.starts_with("%25") {
            out.push('%');
            rest = &tail[3..];
        } else {
            out.push('%');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Builds a `TYPE#value` segment
pub fn segment(kind: &str, value: &str) -> String {
    format!("{}{}{}", kind, DELIMITER, escape_value(value))
}

/// Joins already-built segments with the delimiter
pub fn join(segments: &[&str]) -> String {
    segments.join("#")
}

/// Canonical ISO-8601 form used in keys and timestamps:
/// UTC with millisecond precision and a `Z` suffix.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `CREATED#<ts>` sort token
pub fn created(ts: &str) -> String {
    segment("CREATED", ts)
}

/// `UPDATED#<ts>` sort token
pub fn updated(ts: &str) -> String {
    segment("UPDATED", ts)
}

/// `JOINED#<ts>` sort token
pub fn joined(ts: &str) -> String {
    segment("JOINED", ts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_plain_values_unchanged() {
        assert_eq!(segment("USER", "123"), "USER#123");
        assert_eq!(segment("EMAIL", "a@b.com"), "EMAIL#a@b.com");
    }

    #[test]
    fn test_delimiter_escaped() {
        assert_eq!(segment("USER", "a#b"), "USER#a%23b");
        assert_eq!(segment("USER", "50%"), "USER#50%25");
        assert_ne!(segment("USER", "a#b"), join(&["USER#a", "b"]));
    }

    #[test]
    fn test_escape_round_trip() {
        for raw in ["plain", "a#b", "%23", "#%#", ""] {
            assert_eq!(unescape_value(&escape_value(raw)), raw);
        }
    }

    #[test]
    fn test_iso_timestamp_canonical() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(iso_timestamp(at), "2024-03-01T12:30:00.000Z");
        assert_eq!(created(&iso_timestamp(at)), "CREATED#2024-03-01T12:30:00.000Z");
    }
}
