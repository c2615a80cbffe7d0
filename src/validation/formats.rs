//! Format checks shared by the entity validators

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

use crate::keys::iso_timestamp;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"))
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^https?://.+").expect("url pattern"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?[\d\s\-\(\)]+$").expect("phone pattern"))
}

pub fn is_email(s: &str) -> bool {
    email_regex().is_match(s)
}

pub fn is_url(s: &str) -> bool {
    url_regex().is_match(s)
}

pub fn is_phone(s: &str) -> bool {
    phone_regex().is_match(s)
}

/// True iff `s` is a timestamp in the canonical stored form
/// `YYYY-MM-DDTHH:MM:SS.sssZ`, i.e. it survives a parse/format round trip
pub fn is_canonical_timestamp(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| iso_timestamp(dt.with_timezone(&Utc)) == s)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(is_email("a@b.com"));
        assert!(is_email("first.last+tag@sub.example.org"));
        assert!(!is_email("a@b"));
        assert!(!is_email("a b@c.com"));
        assert!(!is_email("@b.com"));
    }

    #[test]
    fn test_url() {
        assert!(is_url("https://madmall.example"));
        assert!(is_url("http://x"));
        assert!(!is_url("ftp://files.example"));
        assert!(!is_url("https://"));
    }

    #[test]
    fn test_phone() {
        assert!(is_phone("+1 (555) 010-9999"));
        assert!(!is_phone("call me"));
    }

    #[test]
    fn test_canonical_timestamp() {
        assert!(is_canonical_timestamp("2024-01-15T08:00:00.000Z"));
        assert!(!is_canonical_timestamp("2024-01-15T08:00:00Z"));
        assert!(!is_canonical_timestamp("2024-01-15T08:00:00.000+00:00"));
        assert!(!is_canonical_timestamp("2024-01-15"));
        assert!(!is_canonical_timestamp("not a date"));
    }
}
