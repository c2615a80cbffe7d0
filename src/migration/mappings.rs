//! Built-in mappings for the legacy MADMall tables.

use serde_json::json;
use std::collections::BTreeMap;

use super::mapping::{
    FieldTransform, KeyMapping, KeyPattern, KeyRule, MigrationMapping, MigrationPlan,
    Transformation,
};
use crate::entity::EntityType;
use crate::keys::KeyAttr;

pub const DEFAULT_PLAN_NAME: &str = "MADMall to DynamoDB Migration";
pub const DEFAULT_PLAN_VERSION: &str = "1.0.0";

fn json_array(field: &str) -> FieldTransform {
    FieldTransform::JsonArray(field.to_string())
}

fn json_object(field: &str) -> FieldTransform {
    FieldTransform::JsonObject(field.to_string())
}

fn default_true(field: &str) -> FieldTransform {
    FieldTransform::BoolDefaultTrue(field.to_string())
}

fn strict_true(field: &str) -> FieldTransform {
    FieldTransform::BoolStrictTrue(field.to_string())
}

fn or_default(field: &str, value: serde_json::Value) -> FieldTransform {
    FieldTransform::OrDefault {
        field: field.to_string(),
        value,
    }
}

fn or_zero(field: &str) -> FieldTransform {
    FieldTransform::OrZero(field.to_string())
}

fn iso_date(field: &str) -> FieldTransform {
    FieldTransform::IsoDate(field.to_string())
}

/// Envelope shared by every mapping: type, version, tenant and timestamps
fn envelope(mapping: MigrationMapping, entity_type: EntityType) -> MigrationMapping {
    mapping
        .constant("entityType", entity_type.as_str())
        .constant("version", 1)
        .copy("tenantId", "tenantId")
        .copy("createdAt", "createdAt")
        .copy("updatedAt", "updatedAt")
        .transform("createdAt", Transformation::NormalizeIsoDate)
        .transform("updatedAt", Transformation::NormalizeIsoDate)
}

pub fn users() -> MigrationMapping {
    let keys = KeyMapping::new(KeyRule::field("USER", "id"), KeyRule::fixed("PROFILE"))
        .with(KeyAttr::Gsi1Pk, KeyRule::field("EMAIL", "email"))
        .with(KeyAttr::Gsi1Sk, KeyRule::field("USER", "id"))
        .with(KeyAttr::Gsi4Pk, KeyRule::tenant("USERS"))
        .with(KeyAttr::Gsi4Sk, KeyRule::created("createdAt"));

    let mapping = MigrationMapping::new(EntityType::User.as_str(), "users", keys)
        .copy("userId", "id")
        .copy("email", "email")
        .copy("profile.firstName", "firstName")
        .copy("profile.lastName", "lastName")
        .copy("profile.bio", "bio")
        .derive("profile.culturalBackground", json_array("culturalBackground"))
        .copy("profile.communicationStyle", "communicationStyle")
        .copy("profile.diagnosisStage", "diagnosisStage")
        .derive("profile.supportNeeds", json_array("supportNeeds"))
        .copy("profile.joinDate", "createdAt")
        .copy("profile.lastActive", "lastActive")
        .derive(
            "preferences.profileVisibility",
            or_default("profileVisibility", json!("circles_only")),
        )
        .derive("preferences.showRealName", default_true("showRealName"))
        .derive("preferences.allowDirectMessages", default_true("allowDirectMessages"))
        .derive("preferences.shareHealthJourney", default_true("shareHealthJourney"))
        .derive("preferences.emailNotifications", default_true("emailNotifications"))
        .derive("preferences.pushNotifications", default_true("pushNotifications"))
        .derive("preferences.weeklyDigest", default_true("weeklyDigest"))
        .derive("preferences.circleNotifications", default_true("circleNotifications"))
        .derive("preferences.contentPreferences", json_array("contentPreferences"))
        .derive("preferences.circleInterests", json_array("circleInterests"))
        .derive("settings.theme", or_default("theme", json!("auto")))
        .derive("settings.language", or_default("language", json!("en")))
        .derive("settings.timezone", or_default("timezone", json!("UTC")))
        .derive("primaryGoals", json_array("primaryGoals"))
        .derive("isVerified", strict_true("isVerified"))
        .derive("isActive", default_true("isActive"));

    envelope(mapping, EntityType::User)
}

pub fn circles() -> MigrationMapping {
    let keys = KeyMapping::new(KeyRule::field("CIRCLE", "id"), KeyRule::fixed("METADATA"))
        .pattern(KeyPattern::CirclesByType, "type")
        .with(KeyAttr::Gsi1Sk, KeyRule::created("createdAt"))
        .pattern(KeyPattern::CirclesByStatus, "status")
        .with(KeyAttr::Gsi3Sk, KeyRule::updated("updatedAt"))
        .with(KeyAttr::Gsi4Pk, KeyRule::tenant("CIRCLES"))
        .with(KeyAttr::Gsi4Sk, KeyRule::created("createdAt"));

    let mapping = MigrationMapping::new(EntityType::Circle.as_str(), "circles", keys)
        .copy("circleId", "id")
        .copy("name", "name")
        .copy("description", "description")
        .copy("type", "type")
        .derive("privacyLevel", or_default("privacyLevel", json!("public")))
        .derive("settings.isPrivate", strict_true("isPrivate"))
        .derive("settings.requireApproval", strict_true("requireApproval"))
        .copy("settings.maxMembers", "maxMembers")
        .derive("settings.culturalFocus", json_array("culturalFocus"))
        .derive("settings.allowGuestPosts", default_true("allowGuestPosts"))
        .derive(
            "settings.moderationLevel",
            or_default("moderationLevel", json!("moderate")),
        )
        .copy("settings.contentGuidelines", "contentGuidelines")
        .derive("moderators", json_array("moderators"))
        .derive("tags", json_array("tags"))
        .copy("coverImage", "coverImage")
        .derive("stats.memberCount", or_zero("memberCount"))
        .derive("stats.activeMembers", or_zero("activeMembers"))
        .derive("stats.postsThisWeek", or_zero("postsThisWeek"))
        .derive("stats.postsThisMonth", or_zero("postsThisMonth"))
        .derive("stats.engagementRate", or_zero("engagementRate"))
        .derive("stats.averageResponseTime", or_zero("averageResponseTime"))
        .copy("createdBy", "createdBy")
        .derive("isActive", default_true("isActive"))
        .derive(
            "status",
            FieldTransform::ChooseDefaultTrue {
                field: "isActive".to_string(),
                when_true: json!("ACTIVE"),
                when_false: json!("INACTIVE"),
            },
        );

    envelope(mapping, EntityType::Circle)
}

pub fn stories() -> MigrationMapping {
    let keys = KeyMapping::new(KeyRule::field("STORY", "id"), KeyRule::fixed("METADATA"))
        .pattern(KeyPattern::StoriesByAuthor, "author.id")
        .with(KeyAttr::Gsi1Sk, KeyRule::created("createdAt"))
        .with(KeyAttr::Gsi2Pk, KeyRule::fixed("STORY_FEED"))
        .with(KeyAttr::Gsi2Sk, KeyRule::created("createdAt"))
        .pattern(KeyPattern::StoriesByStatus, "status")
        .with(KeyAttr::Gsi3Sk, KeyRule::created("createdAt"));

    let mapping = MigrationMapping::new(EntityType::Story.as_str(), "stories", keys)
        .copy("storyId", "id")
        .copy("title", "title")
        .copy("content", "content")
        .copy("excerpt", "excerpt")
        .copy("author.id", "authorId")
        .copy("author.displayName", "authorDisplayName")
        .copy("author.avatar", "authorAvatar")
        .derive("author.isVerified", strict_true("authorIsVerified"))
        .derive("type", or_default("type", json!("personal_experience")))
        .derive("status", or_default("status", json!("published")))
        .derive("themes", json_array("themes"))
        .derive("tags", json_array("tags"))
        .copy("circleId", "circleId")
        .derive("engagement.likes", or_zero("likes"))
        .derive("engagement.comments", or_zero("comments"))
        .derive("engagement.shares", or_zero("shares"))
        .derive("engagement.saves", or_zero("saves"))
        .derive("engagement.views", or_zero("views"))
        .derive("engagement.helpfulVotes", or_zero("helpfulVotes"))
        .derive("metadata.readTime", or_default("readTime", json!(5)))
        .derive("metadata.wordCount", or_zero("wordCount"))
        .derive("metadata.culturalElements", json_array("culturalElements"))
        .derive("metadata.therapeuticValue", json_array("therapeuticValue"))
        .derive("metadata.triggerWarnings", json_array("triggerWarnings"))
        .derive("metadata.ageAppropriate", default_true("ageAppropriate"))
        .derive("moderationStatus", or_default("moderationStatus", json!("approved")))
        .copy("moderationNotes", "moderationNotes")
        .derive("featuredAt", iso_date("featuredAt"))
        .derive("publishedAt", iso_date("publishedAt"));

    envelope(mapping, EntityType::Story)
}

pub fn businesses() -> MigrationMapping {
    let keys = KeyMapping::new(KeyRule::field("BUSINESS", "id"), KeyRule::fixed("METADATA"))
        .pattern(KeyPattern::BusinessesByCategory, "category")
        .with(KeyAttr::Gsi1Sk, KeyRule::field("NAME", "name"))
        .pattern(KeyPattern::BusinessesByStatus, "status")
        .with(KeyAttr::Gsi3Sk, KeyRule::updated("updatedAt"));

    let mapping = MigrationMapping::new(EntityType::Business.as_str(), "businesses", keys)
        .copy("businessId", "id")
        .copy("profile.name", "name")
        .copy("profile.description", "description")
        .copy("profile.mission", "mission")
        .copy("profile.foundedYear", "foundedYear")
        .copy("profile.founderStory", "founderStory")
        .copy("profile.website", "website")
        .derive("profile.socialMedia", json_object("socialMedia"))
        .copy("profile.contact.email", "email")
        .copy("profile.contact.phone", "phone")
        .copy("profile.logo", "logo")
        .copy("profile.coverImage", "coverImage")
        .derive("profile.gallery", json_array("gallery"))
        .derive("type", or_default("type", json!("wellness_center")))
        .derive("status", or_default("status", json!("active")))
        .derive("category", or_default("category", json!("general")))
        .derive("certifications", json_array("certifications"))
        .derive("specialties", json_array("specialties"))
        .derive("servicesOffered", json_array("servicesOffered"))
        .derive("targetAudience", json_array("targetAudience"))
        .derive("culturalCompetencies", json_array("culturalCompetencies"))
        .derive("metrics.rating", or_zero("rating"))
        .derive("metrics.reviewCount", or_zero("reviewCount"))
        .derive("metrics.trustScore", or_zero("trustScore"))
        .derive("metrics.responseRate", or_zero("responseRate"))
        .derive("metrics.averageResponseTime", or_zero("averageResponseTime"))
        .derive("metrics.repeatCustomerRate", or_zero("repeatCustomerRate"))
        .copy("ownerId", "ownerId")
        .derive("verifiedAt", iso_date("verifiedAt"))
        .derive("featuredUntil", iso_date("featuredUntil"));

    envelope(mapping, EntityType::Business)
}

pub fn resources() -> MigrationMapping {
    let keys = KeyMapping::new(KeyRule::field("RESOURCE", "id"), KeyRule::fixed("METADATA"))
        .pattern(KeyPattern::ResourcesByType, "type")
        .with(KeyAttr::Gsi1Sk, KeyRule::created("createdAt"))
        .pattern(KeyPattern::ResourcesByCategory, "category")
        .with(KeyAttr::Gsi2Sk, KeyRule::field("TITLE", "title"))
        .pattern(KeyPattern::ResourcesByStatus, "status")
        .with(KeyAttr::Gsi3Sk, KeyRule::updated("updatedAt"))
        .with(KeyAttr::Gsi4Pk, KeyRule::tenant("RESOURCES"))
        .with(KeyAttr::Gsi4Sk, KeyRule::created("createdAt"));

    let mapping = MigrationMapping::new(EntityType::Resource.as_str(), "resources", keys)
        .copy("resourceId", "id")
        .copy("title", "title")
        .copy("description", "description")
        .copy("content", "content")
        .copy("summary", "summary")
        .derive("type", or_default("type", json!("article")))
        .copy("category", "category")
        .derive("subcategories", json_array("subcategories"))
        .derive("status", or_default("status", json!("published")))
        .copy("author.id", "authorId")
        .copy("author.name", "authorName")
        .derive("author.credentials", json_array("authorCredentials"))
        .copy("author.bio", "authorBio")
        .copy("author.avatar", "authorAvatar")
        .derive("author.isVerified", strict_true("authorIsVerified"))
        .derive("author.specialties", json_array("authorSpecialties"))
        .derive("metadata.readTime", or_default("readTime", json!(5)))
        .derive("metadata.difficulty", or_default("difficulty", json!("beginner")))
        .derive("metadata.prerequisites", json_array("prerequisites"))
        .derive("metadata.learningObjectives", json_array("learningObjectives"))
        .derive(
            "metadata.culturalConsiderations",
            json_array("culturalConsiderations"),
        )
        .derive("metadata.therapeuticValue", json_array("therapeuticValue"))
        .derive("metadata.evidenceBased", strict_true("evidenceBased"))
        .derive("engagement.views", or_zero("views"))
        .derive("engagement.likes", or_zero("likes"))
        .derive("engagement.saves", or_zero("saves"))
        .derive("engagement.shares", or_zero("shares"))
        .derive("engagement.helpfulVotes", or_zero("helpfulVotes"))
        .derive("engagement.averageRating", or_zero("averageRating"))
        .derive("engagement.ratingCount", or_zero("ratingCount"))
        .derive("tags", json_array("tags"))
        .derive("relatedResources", json_array("relatedResources"))
        .copy("externalUrl", "externalUrl")
        .copy("downloadUrl", "downloadUrl")
        .copy("thumbnailUrl", "thumbnailUrl")
        .derive("isPublic", default_true("isPublic"))
        .derive("isPremium", strict_true("isPremium"))
        .derive("publishedAt", iso_date("publishedAt"));

    envelope(mapping, EntityType::Resource)
}

/// The standard plan: users, circles, stories, businesses, resources
pub fn default_plan() -> MigrationPlan {
    let entities = vec![users(), circles(), stories(), businesses(), resources()];
    let validation_rules = entities
        .iter()
        .map(|mapping| (mapping.entity_type.clone(), Vec::new()))
        .collect::<BTreeMap<_, _>>();

    MigrationPlan {
        name: DEFAULT_PLAN_NAME.to_string(),
        description: "Migrate MADMall platform data to DynamoDB single-table design".to_string(),
        version: DEFAULT_PLAN_VERSION.to_string(),
        dependencies: Vec::new(),
        entities,
        validation_rules,
    }
}
