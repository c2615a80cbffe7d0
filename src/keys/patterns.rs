//! Key pattern registry
//!
//! Each pattern is a pure function from identity fields to the key slots
//! it defines. Patterns never read clocks or global state, so the same
//! identity always reproduces the same tuple and migrations can be re-run
//! with upsert semantics.

use super::attributes::{KeyAttr, KeyAttributes};
use super::segment::{escape_value, join, segment};

/// A partition key plus a sort key prefix for `begins_with` range reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPrefix {
    /// Partition slot and value
    pub partition: (KeyAttr, String),
    /// Sort slot and prefix
    pub sort_prefix: (KeyAttr, String),
}

/// Namespace of key patterns for every entity family
pub struct KeyPatterns;

fn primary(pk: String, sk: impl Into<String>) -> KeyAttributes {
    KeyAttributes::new().with(KeyAttr::Pk, pk).with(KeyAttr::Sk, sk)
}

/// Listing statuses of community content are upper-case tokens
/// (`STORY_STATUS#PUBLISHED`) whatever the case of the stored attribute.
fn listing_status(family: &str, status: &str) -> KeyAttributes {
    KeyAttributes::new().with(KeyAttr::Gsi3Pk, segment(family, &status.to_uppercase()))
}

impl KeyPatterns {
    // Users

    /// PK = USER#{userId}, SK = PROFILE
    pub fn user_profile(user_id: &str) -> KeyAttributes {
        primary(segment("USER", user_id), "PROFILE")
    }

    /// GSI1PK = EMAIL#{email}, GSI1SK = USER#{userId}
    pub fn user_by_email(email: &str, user_id: &str) -> KeyAttributes {
        KeyAttributes::new()
            .with(KeyAttr::Gsi1Pk, segment("EMAIL", email))
            .with(KeyAttr::Gsi1Sk, segment("USER", user_id))
    }

    /// PK = USER#{userId}, SK begins with CIRCLE#
    pub fn user_circles(user_id: &str) -> KeyPrefix {
        KeyPrefix {
            partition: (KeyAttr::Pk, segment("USER", user_id)),
            sort_prefix: (KeyAttr::Sk, "CIRCLE#".to_string()),
        }
    }

    // Circles

    pub fn circle_metadata(circle_id: &str) -> KeyAttributes {
        primary(segment("CIRCLE", circle_id), "METADATA")
    }

    /// PK = CIRCLE#{circleId}, SK = MEMBER#{userId}
    pub fn circle_member(circle_id: &str, user_id: &str) -> KeyAttributes {
        primary(segment("CIRCLE", circle_id), segment("MEMBER", user_id))
    }

    /// Inverse of [`KeyPatterns::circle_member`]: PK = USER#{userId}, SK = CIRCLE#{circleId}
    pub fn member_circle(user_id: &str, circle_id: &str) -> KeyAttributes {
        primary(segment("USER", user_id), segment("CIRCLE", circle_id))
    }

    /// PK = CIRCLE#{circleId}, SK begins with MEMBER#
    pub fn circle_members(circle_id: &str) -> KeyPrefix {
        KeyPrefix {
            partition: (KeyAttr::Pk, segment("CIRCLE", circle_id)),
            sort_prefix: (KeyAttr::Sk, "MEMBER#".to_string()),
        }
    }

    pub fn circles_by_type(circle_type: &str) -> KeyAttributes {
        KeyAttributes::new().with(KeyAttr::Gsi1Pk, segment("CIRCLE_TYPE", circle_type))
    }

    pub fn circles_by_status(status: &str) -> KeyAttributes {
        listing_status("CIRCLE_STATUS", status)
    }

    pub fn members_by_status(status: &str) -> KeyAttributes {
        KeyAttributes::new().with(KeyAttr::Gsi3Pk, segment("MEMBER_STATUS", status))
    }

    // Stories

    pub fn story_metadata(story_id: &str) -> KeyAttributes {
        primary(segment("STORY", story_id), "METADATA")
    }

    pub fn story_comment(story_id: &str, comment_id: &str) -> KeyAttributes {
        primary(segment("STORY", story_id), segment("COMMENT", comment_id))
    }

    pub fn story_feed() -> KeyAttributes {
        KeyAttributes::new().with(KeyAttr::Gsi2Pk, "STORY_FEED")
    }

    pub fn stories_by_author(author_id: &str) -> KeyAttributes {
        KeyAttributes::new().with(KeyAttr::Gsi1Pk, segment("AUTHOR", author_id))
    }

    pub fn stories_by_status(status: &str) -> KeyAttributes {
        listing_status("STORY_STATUS", status)
    }

    // Businesses

    pub fn business_metadata(business_id: &str) -> KeyAttributes {
        primary(segment("BUSINESS", business_id), "METADATA")
    }

    pub fn businesses_by_category(category: &str) -> KeyAttributes {
        KeyAttributes::new().with(KeyAttr::Gsi1Pk, segment("BUSINESS_CATEGORY", category))
    }

    pub fn businesses_by_status(status: &str) -> KeyAttributes {
        listing_status("BUSINESS_STATUS", status)
    }

    // Resources

    pub fn resource_metadata(resource_id: &str) -> KeyAttributes {
        primary(segment("RESOURCE", resource_id), "METADATA")
    }

    pub fn resources_by_type(resource_type: &str) -> KeyAttributes {
        KeyAttributes::new().with(KeyAttr::Gsi1Pk, segment("RESOURCE_TYPE", resource_type))
    }

    pub fn resources_by_category(category: &str) -> KeyAttributes {
        KeyAttributes::new().with(KeyAttr::Gsi2Pk, segment("RESOURCE_CATEGORY", category))
    }

    pub fn resources_by_status(status: &str) -> KeyAttributes {
        listing_status("RESOURCE_STATUS", status)
    }

    // Tenants

    pub fn tenant_users(tenant_id: &str) -> KeyAttributes {
        Self::tenant(tenant_id, "USERS")
    }

    pub fn tenant_circles(tenant_id: &str) -> KeyAttributes {
        Self::tenant(tenant_id, "CIRCLES")
    }

    pub fn tenant_resources(tenant_id: &str) -> KeyAttributes {
        Self::tenant(tenant_id, "RESOURCES")
    }

    /// GSI4PK = TENANT#{tenantId}#{family}
    fn tenant(tenant_id: &str, family: &str) -> KeyAttributes {
        KeyAttributes::new().with(KeyAttr::Gsi4Pk, join(&[&segment("TENANT", tenant_id), family]))
    }

    // Images and moderation

    pub fn image_metadata(image_id: &str) -> KeyAttributes {
        primary(segment("IMAGE", image_id), "METADATA")
    }

    pub fn images_by_category(category: &str) -> KeyAttributes {
        KeyAttributes::new().with(KeyAttr::Gsi1Pk, segment("IMAGE_CATEGORY", category))
    }

    pub fn image_status(status: &str) -> KeyAttributes {
        KeyAttributes::new().with(KeyAttr::Gsi3Pk, segment("IMAGE_STATUS", status))
    }

    /// Feedback is partitioned per image and ordered per user and time:
    /// PK = FEEDBACK#IMAGE#{imageId}, SK = USER#{userId}#TS#{ts},
    /// GSI1PK = IMAGE#{imageId}#FEEDBACK, GSI1SK = TS#{ts}
    pub fn feedback_for_image(image_id: &str, user_id: &str, timestamp: &str) -> KeyAttributes {
        let image = segment("IMAGE", image_id);
        let ts = segment("TS", timestamp);
        KeyAttributes::new()
            .with(KeyAttr::Pk, join(&["FEEDBACK", &image]))
            .with(KeyAttr::Sk, join(&[&segment("USER", user_id), &ts]))
            .with(KeyAttr::Gsi1Pk, join(&[&image, "FEEDBACK"]))
            .with(KeyAttr::Gsi1Sk, ts)
    }

    pub fn feedback_by_severity(severity: &str) -> KeyAttributes {
        KeyAttributes::new().with(KeyAttr::Gsi3Pk, segment("FEEDBACK_SEVERITY", severity))
    }

    pub fn incident_metadata(incident_id: &str) -> KeyAttributes {
        primary(segment("INCIDENT", incident_id), "METADATA")
    }

    pub fn incident_status(status: &str) -> KeyAttributes {
        KeyAttributes::new().with(KeyAttr::Gsi3Pk, segment("INCIDENT_STATUS", status))
    }

    /// PRIORITY#{priority}#CREATED#{ts}
    pub fn incident_priority_sort(priority: &str, created_at: &str) -> KeyAttributes {
        KeyAttributes::new().with(
            KeyAttr::Gsi3Sk,
            join(&[&segment("PRIORITY", priority), &segment("CREATED", created_at)]),
        )
    }

    /// All reviews share one queue partition: PK = ADVISORY#QUEUE, SK = REVIEW#{reviewId}
    pub fn advisory_queue(review_id: &str) -> KeyAttributes {
        primary("ADVISORY#QUEUE".to_string(), segment("REVIEW", review_id))
    }

    pub fn advisory_by_target(target_type: &str, target_id: &str) -> KeyAttributes {
        KeyAttributes::new().with(
            KeyAttr::Gsi1Pk,
            join(&[&segment("REVIEW_TARGET", target_type), &escape_value(target_id)]),
        )
    }

    pub fn advisory_by_status(status: &str) -> KeyAttributes {
        KeyAttributes::new().with(KeyAttr::Gsi3Pk, segment("REVIEW_STATUS", status))
    }

    pub fn premium_source_metadata(source_id: &str) -> KeyAttributes {
        primary(segment("PREMIUM_SOURCE", source_id), "METADATA")
    }

    pub fn premium_by_provider(provider: &str) -> KeyAttributes {
        KeyAttributes::new().with(KeyAttr::Gsi1Pk, segment("PROVIDER", provider))
    }

    // Personalization

    pub fn personalization_profile(user_id: &str) -> KeyAttributes {
        primary(segment("USER", user_id), "PERSONALIZATION")
    }

    pub fn personalization_by_cohort(cohort_id: &str) -> KeyAttributes {
        KeyAttributes::new().with(KeyAttr::Gsi1Pk, segment("COHORT", cohort_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_patterns() {
        let keys = KeyPatterns::user_profile("123");
        assert_eq!(keys.get(KeyAttr::Pk), Some("USER#123"));
        assert_eq!(keys.get(KeyAttr::Sk), Some("PROFILE"));

        let email = KeyPatterns::user_by_email("a@b.com", "123");
        assert_eq!(email.get(KeyAttr::Gsi1Pk), Some("EMAIL#a@b.com"));
        assert_eq!(email.get(KeyAttr::Gsi1Sk), Some("USER#123"));
        assert_eq!(email.get(KeyAttr::Pk), None);
    }

    #[test]
    fn test_member_mirror() {
        let forward = KeyPatterns::circle_member("c1", "u1");
        let inverse = KeyPatterns::member_circle("u1", "c1");
        assert_eq!(forward.get(KeyAttr::Pk), Some("CIRCLE#c1"));
        assert_eq!(forward.get(KeyAttr::Sk), Some("MEMBER#u1"));
        assert_eq!(inverse.get(KeyAttr::Pk), Some("USER#u1"));
        assert_eq!(inverse.get(KeyAttr::Sk), Some("CIRCLE#c1"));

        let prefix = KeyPatterns::user_circles("u1");
        assert!(inverse.get(KeyAttr::Sk).unwrap().starts_with(&prefix.sort_prefix.1));
        assert_eq!(prefix.partition.1, "USER#u1");
    }

    #[test]
    fn test_tenant_patterns() {
        assert_eq!(
            KeyPatterns::tenant_users("acme").get(KeyAttr::Gsi4Pk),
            Some("TENANT#acme#USERS")
        );
        assert_eq!(
            KeyPatterns::tenant_circles("acme").get(KeyAttr::Gsi4Pk),
            Some("TENANT#acme#CIRCLES")
        );
        assert_ne!(
            KeyPatterns::tenant_users("acme"),
            KeyPatterns::tenant_resources("acme")
        );
    }

    #[test]
    fn test_listing_status_is_case_insensitive() {
        assert_eq!(
            KeyPatterns::stories_by_status("published"),
            KeyPatterns::stories_by_status("PUBLISHED")
        );
        assert_eq!(
            KeyPatterns::businesses_by_status("active").get(KeyAttr::Gsi3Pk),
            Some("BUSINESS_STATUS#ACTIVE")
        );
        assert_eq!(
            KeyPatterns::image_status("pending_review").get(KeyAttr::Gsi3Pk),
            Some("IMAGE_STATUS#pending_review")
        );
    }

    #[test]
    fn test_feedback_pattern() {
        let keys = KeyPatterns::feedback_for_image("img1", "u1", "2024-01-01T00:00:00.000Z");
        assert_eq!(keys.get(KeyAttr::Pk), Some("FEEDBACK#IMAGE#img1"));
        assert_eq!(keys.get(KeyAttr::Sk), Some("USER#u1#TS#2024-01-01T00:00:00.000Z"));
        assert_eq!(keys.get(KeyAttr::Gsi1Pk), Some("IMAGE#img1#FEEDBACK"));
        assert_eq!(keys.get(KeyAttr::Gsi1Sk), Some("TS#2024-01-01T00:00:00.000Z"));
    }

    #[test]
    fn test_advisory_patterns() {
        let keys = KeyPatterns::advisory_queue("r1");
        assert_eq!(keys.get(KeyAttr::Pk), Some("ADVISORY#QUEUE"));
        assert_eq!(keys.get(KeyAttr::Sk), Some("REVIEW#r1"));
        assert_eq!(
            KeyPatterns::advisory_by_target("image", "img9").get(KeyAttr::Gsi1Pk),
            Some("REVIEW_TARGET#image#img9")
        );
    }

    #[test]
    fn test_same_partition_distinct_sort_keys() {
        let profile = KeyPatterns::user_profile("u1");
        let personalization = KeyPatterns::personalization_profile("u1");
        assert_eq!(profile.get(KeyAttr::Pk), personalization.get(KeyAttr::Pk));
        assert_ne!(profile, personalization);
    }

    #[test]
    fn test_delimiter_in_identity_stays_injective() {
        // "a#b" + "c" must not collide with "a" + "b#c"
        let left = KeyPatterns::circle_member("a#b", "c");
        let right = KeyPatterns::circle_member("a", "b#c");
        assert_ne!(left, right);

        let left = KeyPatterns::advisory_by_target("image#x", "y");
        let right = KeyPatterns::advisory_by_target("image", "x#y");
        assert_ne!(left, right);
    }
}
