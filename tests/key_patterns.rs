//! Key Pattern Tests
//!
//! - Patterns are deterministic
//! - Distinct identities never share a key tuple
//! - Delimiters inside identities cannot forge segments
//! - Tenant listings go through GSI4

use chrono::{TimeZone, Utc};
use madmall_db::keys::segment::{escape_value, segment, unescape_value};
use madmall_db::keys::{iso_timestamp, KeyAttr, KeyPatterns};
use std::collections::HashSet;

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_user_profile_example() {
    let keys = KeyPatterns::user_profile("u1").merge(KeyPatterns::user_by_email("a@b.com", "u1"));

    assert_eq!(keys.get(KeyAttr::Pk), Some("USER#u1"));
    assert_eq!(keys.get(KeyAttr::Sk), Some("PROFILE"));
    assert_eq!(keys.get(KeyAttr::Gsi1Pk), Some("EMAIL#a@b.com"));
    assert_eq!(keys.get(KeyAttr::Gsi1Sk), Some("USER#u1"));
}

#[test]
fn test_patterns_are_deterministic() {
    for _ in 0..50 {
        assert_eq!(
            KeyPatterns::circle_member("c1", "u1"),
            KeyPatterns::circle_member("c1", "u1")
        );
        assert_eq!(KeyPatterns::story_feed(), KeyPatterns::story_feed());
    }
}

// =============================================================================
// Injectivity
// =============================================================================

#[test]
fn test_distinct_identities_distinct_keys() {
    let ids = ["a", "b", "a#b", "a%23b", "a%b", "", "USER#a"];
    let mut seen = HashSet::new();
    for id in ids {
        let keys = KeyPatterns::user_profile(id);
        let pk = keys.get(KeyAttr::Pk).unwrap().to_string();
        assert!(seen.insert(pk), "collision for {:?}", id);
    }
}

#[test]
fn test_membership_pair_cannot_be_forged() {
    let forged = KeyPatterns::circle_member("c1#MEMBER", "u1");
    let honest = KeyPatterns::circle_member("c1", "MEMBER#u1");
    assert_ne!(forged, honest);
    assert_eq!(forged.get(KeyAttr::Pk), Some("CIRCLE#c1%23MEMBER"));
}

#[test]
fn test_escaping_reverses() {
    for raw in ["plain", "with#hash", "with%percent", "%23", "##%%"] {
        assert_eq!(unescape_value(&escape_value(raw)), raw);
    }
    assert_eq!(segment("EMAIL", "a@b.com"), "EMAIL#a@b.com");
}

// =============================================================================
// Indexes and ordering
// =============================================================================

#[test]
fn test_tenant_listing_on_gsi4() {
    let keys = KeyPatterns::tenant_users("acme");
    assert_eq!(keys.get(KeyAttr::Gsi4Pk), Some("TENANT#acme#USERS"));
    assert_eq!(keys.get(KeyAttr::Pk), None);
}

#[test]
fn test_timestamps_sort_lexicographically() {
    let early = iso_timestamp(Utc.with_ymd_and_hms(2024, 1, 9, 23, 0, 0).unwrap());
    let late = iso_timestamp(Utc.with_ymd_and_hms(2024, 1, 10, 1, 0, 0).unwrap());
    assert_eq!(early, "2024-01-09T23:00:00.000Z");
    assert!(early < late);
}
