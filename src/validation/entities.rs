//! Per-entity validators
//!
//! Each validator inspects the JSON form of one entity type. A missing
//! required field yields exactly one REQUIRED error; length, format and
//! enum checks run only on present values.

use serde_json::Value;

use super::formats::{is_email, is_phone, is_url};
use super::report::{IssueCode, ValidationReport};
use crate::document::{get_path, is_truthy, str_len};
use crate::entity::EntityType;

const THEMES: [&str; 3] = ["light", "dark", "auto"];
const MODERATION_LEVELS: [&str; 3] = ["light", "moderate", "strict"];
const STORY_TYPES: [&str; 6] = [
    "personal_experience",
    "milestone_celebration",
    "challenge_overcome",
    "advice_sharing",
    "gratitude_expression",
    "awareness_raising",
];
const STORY_STATUSES: [&str; 5] = ["draft", "published", "archived", "flagged", "removed"];
const RESOURCE_TYPES: [&str; 10] = [
    "article",
    "video",
    "podcast",
    "infographic",
    "checklist",
    "guide",
    "research_paper",
    "webinar",
    "tool",
    "template",
];
const IMAGE_STATUSES: [&str; 5] = ["active", "archived", "flagged", "removed", "pending_review"];
const IMAGE_SCORES: [&str; 3] = ["culturalScore", "sensitivityScore", "inclusivityScore"];
const FEEDBACK_SEVERITIES: [&str; 4] = ["low", "medium", "high", "critical"];
const FEEDBACK_STATUSES: [&str; 5] = ["new", "acknowledged", "in_review", "resolved", "dismissed"];
const INCIDENT_TRIGGERS: [&str; 4] = [
    "community_report",
    "automated_detection",
    "staff",
    "advisory_board",
];
const INCIDENT_PRIORITIES: [&str; 3] = ["p1", "p2", "p3"];
const REVIEW_TARGETS: [&str; 3] = ["image", "resource", "story"];
const REVIEW_STATUSES: [&str; 5] = [
    "queued",
    "in_review",
    "approved",
    "changes_requested",
    "rejected",
];
const PROVIDERS: [&str; 3] = ["createher", "nappy", "other"];

/// Read-only view over the document under validation
struct Doc<'a>(&'a Value);

impl<'a> Doc<'a> {
    fn get(&self, path: &str) -> Option<&'a Value> {
        get_path(self.0, path)
    }

    fn present(&self, path: &str) -> bool {
        is_truthy(self.get(path))
    }

    fn text(&self, path: &str) -> Option<&'a str> {
        self.get(path).and_then(Value::as_str)
    }

    fn len(&self, path: &str) -> Option<usize> {
        self.get(path).and_then(str_len)
    }

    fn value(&self, path: &str) -> Value {
        self.get(path).cloned().unwrap_or(Value::Null)
    }

    /// A present value outside `allowed`
    fn not_one_of(&self, path: &str, allowed: &[&str]) -> bool {
        self.present(path) && !self.text(path).is_some_and(|s| allowed.contains(&s))
    }

    /// A present value failing `check`; non-strings always fail
    fn fails(&self, path: &str, check: fn(&str) -> bool) -> bool {
        self.present(path) && !self.text(path).is_some_and(check)
    }
}

fn require(report: &mut ValidationReport, doc: &Doc, path: &str, message: &str) -> bool {
    if doc.present(path) {
        true
    } else {
        report.error(path, message, IssueCode::Required);
        false
    }
}

pub fn validate_user(user: &Value) -> ValidationReport {
    let mut report = ValidationReport::new();
    let doc = Doc(user);

    require(&mut report, &doc, "userId", "User ID is required");
    if require(&mut report, &doc, "email", "Email is required") && doc.fails("email", is_email) {
        report.error_with("email", "Invalid email format", IssueCode::InvalidFormat, doc.value("email"));
    }

    if doc.present("profile") {
        require(&mut report, &doc, "profile.firstName", "First name is required");
        require(&mut report, &doc, "profile.lastName", "Last name is required");
        if let Some(len) = doc.len("profile.bio").filter(|len| *len > 500) {
            report.warning_with(
                "profile.bio",
                "Bio is longer than recommended 500 characters",
                IssueCode::LengthWarning,
                len,
            );
        }
        if !doc.get("profile.culturalBackground").is_some_and(Value::is_array) {
            report.warning(
                "profile.culturalBackground",
                "Cultural background should be an array",
                IssueCode::TypeWarning,
            );
        }
    } else {
        report.error("profile", "Profile is required", IssueCode::Required);
    }

    if doc.not_one_of("settings.theme", &THEMES) {
        report.error_with(
            "settings.theme",
            "Invalid theme value",
            IssueCode::InvalidValue,
            doc.value("settings.theme"),
        );
    }

    report
}

pub fn validate_circle(circle: &Value) -> ValidationReport {
    let mut report = ValidationReport::new();
    let doc = Doc(circle);

    require(&mut report, &doc, "circleId", "Circle ID is required");
    if require(&mut report, &doc, "name", "Circle name is required") {
        match doc.len("name") {
            Some(len) if len < 3 => report.error_with(
                "name",
                "Circle name must be at least 3 characters",
                IssueCode::MinLength,
                len,
            ),
            Some(len) if len > 100 => report.error_with(
                "name",
                "Circle name must be less than 100 characters",
                IssueCode::MaxLength,
                len,
            ),
            _ => {}
        }
    }

    if !doc.present("description") {
        report.warning(
            "description",
            "Circle description is recommended",
            IssueCode::Recommended,
        );
    } else if let Some(len) = doc.len("description").filter(|len| *len > 1000) {
        report.warning_with(
            "description",
            "Description is longer than recommended 1000 characters",
            IssueCode::LengthWarning,
            len,
        );
    }

    require(&mut report, &doc, "type", "Circle type is required");
    require(&mut report, &doc, "createdBy", "Creator ID is required");

    if doc.present("settings.maxMembers") {
        let max = doc.get("settings.maxMembers").and_then(Value::as_f64);
        if max.is_some_and(|m| !(2.0..=10000.0).contains(&m)) {
            report.error_with(
                "settings.maxMembers",
                "Max members must be between 2 and 10000",
                IssueCode::RangeError,
                doc.value("settings.maxMembers"),
            );
        }
    }
    if doc.not_one_of("settings.moderationLevel", &MODERATION_LEVELS) {
        report.error_with(
            "settings.moderationLevel",
            "Invalid moderation level",
            IssueCode::InvalidValue,
            doc.value("settings.moderationLevel"),
        );
    }

    report
}

pub fn validate_story(story: &Value) -> ValidationReport {
    let mut report = ValidationReport::new();
    let doc = Doc(story);

    require(&mut report, &doc, "storyId", "Story ID is required");
    if require(&mut report, &doc, "title", "Story title is required") {
        match doc.len("title") {
            Some(len) if len < 5 => report.error_with(
                "title",
                "Story title must be at least 5 characters",
                IssueCode::MinLength,
                len,
            ),
            Some(len) if len > 200 => report.error_with(
                "title",
                "Story title must be less than 200 characters",
                IssueCode::MaxLength,
                len,
            ),
            _ => {}
        }
    }

    if require(&mut report, &doc, "content", "Story content is required") {
        match doc.len("content") {
            Some(len) if len < 50 => report.warning_with(
                "content",
                "Story content is quite short",
                IssueCode::LengthWarning,
                len,
            ),
            Some(len) if len > 50000 => report.warning_with(
                "content",
                "Story content is very long",
                IssueCode::LengthWarning,
                len,
            ),
            _ => {}
        }
    }

    require(&mut report, &doc, "author.id", "Author ID is required");

    if doc.not_one_of("type", &STORY_TYPES) {
        report.error_with("type", "Invalid story type", IssueCode::InvalidValue, doc.value("type"));
    }
    if doc.not_one_of("status", &STORY_STATUSES) {
        report.error_with(
            "status",
            "Invalid story status",
            IssueCode::InvalidValue,
            doc.value("status"),
        );
    }

    report
}

pub fn validate_business(business: &Value) -> ValidationReport {
    let mut report = ValidationReport::new();
    let doc = Doc(business);

    require(&mut report, &doc, "businessId", "Business ID is required");
    if !require(&mut report, &doc, "profile", "Business profile is required") {
        return report;
    }

    if require(&mut report, &doc, "profile.name", "Business name is required") {
        if let Some(len) = doc.len("profile.name").filter(|len| *len < 2) {
            report.error_with(
                "profile.name",
                "Business name must be at least 2 characters",
                IssueCode::MinLength,
                len,
            );
        }
    }

    if !doc.present("profile.description") {
        report.warning(
            "profile.description",
            "Business description is recommended",
            IssueCode::Recommended,
        );
    }

    if require(&mut report, &doc, "profile.contact.email", "Contact email is required")
        && doc.fails("profile.contact.email", is_email)
    {
        report.error_with(
            "profile.contact.email",
            "Invalid email format",
            IssueCode::InvalidFormat,
            doc.value("profile.contact.email"),
        );
    }

    if doc.fails("profile.website", is_url) {
        report.error_with(
            "profile.website",
            "Invalid website URL format",
            IssueCode::InvalidFormat,
            doc.value("profile.website"),
        );
    }

    if doc.fails("profile.contact.phone", is_phone) {
        report.warning_with(
            "profile.contact.phone",
            "Phone number format may be invalid",
            IssueCode::FormatWarning,
            doc.value("profile.contact.phone"),
        );
    }

    require(&mut report, &doc, "ownerId", "Owner ID is required");

    report
}

pub fn validate_resource(resource: &Value) -> ValidationReport {
    let mut report = ValidationReport::new();
    let doc = Doc(resource);

    require(&mut report, &doc, "resourceId", "Resource ID is required");
    if require(&mut report, &doc, "title", "Resource title is required") {
        if let Some(len) = doc.len("title").filter(|len| *len < 5) {
            report.error_with(
                "title",
                "Resource title must be at least 5 characters",
                IssueCode::MinLength,
                len,
            );
        }
    }
    require(&mut report, &doc, "description", "Resource description is required");
    if !doc.present("summary") {
        report.warning("summary", "Resource summary is recommended", IssueCode::Recommended);
    }
    require(&mut report, &doc, "category", "Resource category is required");
    require(&mut report, &doc, "author.id", "Author ID is required");

    if doc.not_one_of("type", &RESOURCE_TYPES) {
        report.error_with(
            "type",
            "Invalid resource type",
            IssueCode::InvalidValue,
            doc.value("type"),
        );
    }
    if doc.fails("externalUrl", is_url) {
        report.error_with(
            "externalUrl",
            "Invalid external URL format",
            IssueCode::InvalidFormat,
            doc.value("externalUrl"),
        );
    }
    if doc.fails("downloadUrl", is_url) {
        report.error_with(
            "downloadUrl",
            "Invalid download URL format",
            IssueCode::InvalidFormat,
            doc.value("downloadUrl"),
        );
    }

    report
}

pub fn validate_image_asset(image: &Value) -> ValidationReport {
    let mut report = ValidationReport::new();
    let doc = Doc(image);

    require(&mut report, &doc, "imageId", "Image ID is required");
    if require(&mut report, &doc, "url", "Image URL is required") && doc.fails("url", is_url) {
        report.error_with("url", "Invalid image URL format", IssueCode::InvalidFormat, doc.value("url"));
    }
    if doc.fails("thumbnailUrl", is_url) {
        report.warning_with(
            "thumbnailUrl",
            "Thumbnail URL format may be invalid",
            IssueCode::FormatWarning,
            doc.value("thumbnailUrl"),
        );
    }
    let alt_len = doc.text("altText").map(|s| s.trim().chars().count());
    if alt_len.map_or(true, |len| len < 5) {
        report.error(
            "altText",
            "Alt text must be at least 5 characters",
            IssueCode::MinLength,
        );
    }
    require(&mut report, &doc, "category", "Category is required");
    if doc.not_one_of("status", &IMAGE_STATUSES) {
        report.error_with("status", "Invalid status", IssueCode::InvalidValue, doc.value("status"));
    }

    if doc.present("validation") {
        for key in IMAGE_SCORES {
            let path = format!("validation.{}", key);
            let in_range = match doc.get(&path) {
                None => true,
                Some(value) => value.as_f64().is_some_and(|s| (0.0..=1.0).contains(&s)),
            };
            if !in_range {
                report.warning_with(
                    &path,
                    "Score should be between 0 and 1",
                    IssueCode::RangeWarning,
                    doc.value(&path),
                );
            }
        }
    }

    report
}

pub fn validate_feedback(feedback: &Value) -> ValidationReport {
    let mut report = ValidationReport::new();
    let doc = Doc(feedback);

    require(&mut report, &doc, "feedbackId", "Feedback ID is required");
    require(&mut report, &doc, "imageId", "Image ID is required");
    require(&mut report, &doc, "userId", "User ID is required");

    match doc.get("rating") {
        None | Some(Value::Null) => report.error("rating", "Rating is required", IssueCode::Required),
        Some(rating) if !rating.as_f64().is_some_and(|r| (1.0..=5.0).contains(&r)) => {
            report.error_with(
                "rating",
                "Rating must be between 1 and 5",
                IssueCode::RangeError,
                rating.clone(),
            )
        }
        Some(_) => {}
    }

    if !doc.get("categories").is_some_and(Value::is_array) {
        report.warning("categories", "Categories should be an array", IssueCode::TypeWarning);
    }
    if doc.not_one_of("severity", &FEEDBACK_SEVERITIES) {
        report.warning_with(
            "severity",
            "Invalid severity",
            IssueCode::InvalidValue,
            doc.value("severity"),
        );
    }
    if doc.not_one_of("status", &FEEDBACK_STATUSES) {
        report.warning_with("status", "Invalid status", IssueCode::InvalidValue, doc.value("status"));
    }

    report
}

pub fn validate_incident(incident: &Value) -> ValidationReport {
    let mut report = ValidationReport::new();
    let doc = Doc(incident);

    require(&mut report, &doc, "incidentId", "Incident ID is required");
    if require(&mut report, &doc, "triggeredBy", "triggeredBy is required")
        && doc.not_one_of("triggeredBy", &INCIDENT_TRIGGERS)
    {
        report.error_with(
            "triggeredBy",
            "Invalid trigger",
            IssueCode::InvalidValue,
            doc.value("triggeredBy"),
        );
    }
    if !doc.text("priority").is_some_and(|p| INCIDENT_PRIORITIES.contains(&p)) {
        report.error_with(
            "priority",
            "Priority must be p1|p2|p3",
            IssueCode::InvalidValue,
            doc.value("priority"),
        );
    }
    require(&mut report, &doc, "summary", "Summary is required");

    report
}

pub fn validate_advisory_review(review: &Value) -> ValidationReport {
    let mut report = ValidationReport::new();
    let doc = Doc(review);

    require(&mut report, &doc, "reviewId", "Review ID is required");
    if !doc.text("targetType").is_some_and(|t| REVIEW_TARGETS.contains(&t)) {
        report.error_with(
            "targetType",
            "Invalid targetType",
            IssueCode::InvalidValue,
            doc.value("targetType"),
        );
    }
    require(&mut report, &doc, "targetId", "Target ID is required");
    if doc.not_one_of("status", &REVIEW_STATUSES) {
        report.warning_with("status", "Invalid status", IssueCode::InvalidValue, doc.value("status"));
    }

    report
}

pub fn validate_premium_source(source: &Value) -> ValidationReport {
    let mut report = ValidationReport::new();
    let doc = Doc(source);

    require(&mut report, &doc, "sourceId", "Source ID is required");
    if !doc.text("provider").is_some_and(|p| PROVIDERS.contains(&p)) {
        report.error_with(
            "provider",
            "Invalid provider",
            IssueCode::InvalidValue,
            doc.value("provider"),
        );
    }
    require(&mut report, &doc, "displayName", "Display name is required");
    if doc.fails("apiBaseUrl", is_url) {
        report.warning_with(
            "apiBaseUrl",
            "API base URL format may be invalid",
            IssueCode::FormatWarning,
            doc.value("apiBaseUrl"),
        );
    }

    report
}

pub fn validate_personalization(profile: &Value) -> ValidationReport {
    let mut report = ValidationReport::new();
    let doc = Doc(profile);

    require(&mut report, &doc, "userId", "User ID is required");
    if doc.present("engagement") {
        for key in ["impressions", "clicks"] {
            let path = format!("engagement.{}", key);
            let ok = match doc.get(&path) {
                None => true,
                Some(value) => value.as_f64().is_some_and(|n| n >= 0.0),
            };
            if !ok {
                report.warning_with(
                    &path,
                    "Engagement values must be non-negative",
                    IssueCode::RangeWarning,
                    doc.value(&path),
                );
            }
        }
    }

    report
}

/// Runs the entity-specific validator selected by `entityType`.
/// Types without a dedicated validator yield a valid report.
pub fn validate_entity(entity: &Value) -> ValidationReport {
    let entity_type = entity
        .get("entityType")
        .and_then(Value::as_str)
        .and_then(EntityType::parse);
    match entity_type {
        Some(entity_type) => validate_as(entity_type, entity),
        None => ValidationReport::new(),
    }
}

/// Runs the validator for an explicit entity type
pub fn validate_as(entity_type: EntityType, entity: &Value) -> ValidationReport {
    match entity_type {
        EntityType::User => validate_user(entity),
        EntityType::Circle => validate_circle(entity),
        EntityType::Story => validate_story(entity),
        EntityType::Business => validate_business(entity),
        EntityType::Resource => validate_resource(entity),
        EntityType::ImageAsset => validate_image_asset(entity),
        EntityType::Feedback => validate_feedback(entity),
        EntityType::Incident => validate_incident(entity),
        EntityType::AdvisoryReview => validate_advisory_review(entity),
        EntityType::PremiumSource => validate_premium_source(entity),
        EntityType::Personalization => validate_personalization(entity),
        EntityType::CircleMember => ValidationReport::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn codes(report: &ValidationReport) -> Vec<(String, IssueCode)> {
        report
            .errors()
            .iter()
            .map(|e| (e.field.clone(), e.code))
            .collect()
    }

    #[test]
    fn test_user_valid() {
        let user = json!({
            "userId": "u1",
            "email": "a@b.com",
            "profile": {"firstName": "Ada", "lastName": "Moss", "culturalBackground": []},
            "settings": {"theme": "dark"}
        });
        let report = validate_user(&user);
        assert!(report.is_valid());
        assert!(report.warnings().is_empty());
    }

    #[test]
    fn test_user_errors() {
        let user = json!({
            "email": "not-an-email",
            "profile": {"firstName": "Ada", "bio": "x".repeat(501)},
            "settings": {"theme": "neon"}
        });
        let report = validate_user(&user);
        assert_eq!(
            codes(&report),
            vec![
                ("userId".to_string(), IssueCode::Required),
                ("email".to_string(), IssueCode::InvalidFormat),
                ("profile.lastName".to_string(), IssueCode::Required),
                ("settings.theme".to_string(), IssueCode::InvalidValue),
            ]
        );
        let warnings: Vec<IssueCode> = report.warnings().iter().map(|w| w.code).collect();
        assert_eq!(
            warnings,
            vec![IssueCode::LengthWarning, IssueCode::TypeWarning]
        );
        assert_eq!(report.warnings()[0].value, Some(json!(501)));
    }

    #[test]
    fn test_user_missing_profile() {
        let report = validate_user(&json!({"userId": "u1", "email": "a@b.com"}));
        assert_eq!(codes(&report), vec![("profile".to_string(), IssueCode::Required)]);
    }

    #[test]
    fn test_circle_name_bounds() {
        let base = json!({"circleId": "c1", "type": "support", "createdBy": "u1", "description": "d"});
        let with_name = |name: &str| {
            let mut c = base.clone();
            c["name"] = json!(name);
            validate_circle(&c)
        };

        assert_eq!(with_name("ab").errors()[0].code, IssueCode::MinLength);
        assert!(with_name("abc").is_valid());
        assert!(with_name(&"n".repeat(100)).is_valid());
        assert_eq!(with_name(&"n".repeat(101)).errors()[0].code, IssueCode::MaxLength);
    }

    #[test]
    fn test_circle_settings() {
        let circle = json!({
            "circleId": "c1", "name": "Circle", "type": "support", "createdBy": "u1",
            "settings": {"maxMembers": 1, "moderationLevel": "lax"}
        });
        let report = validate_circle(&circle);
        assert_eq!(
            codes(&report),
            vec![
                ("settings.maxMembers".to_string(), IssueCode::RangeError),
                ("settings.moderationLevel".to_string(), IssueCode::InvalidValue),
            ]
        );
        assert_eq!(report.warnings()[0].code, IssueCode::Recommended);
    }

    #[test]
    fn test_story_rules() {
        let story = json!({
            "storyId": "s1",
            "title": "Hi",
            "content": "short",
            "author": {},
            "type": "rant",
            "status": "published"
        });
        let report = validate_story(&story);
        assert_eq!(
            codes(&report),
            vec![
                ("title".to_string(), IssueCode::MinLength),
                ("author.id".to_string(), IssueCode::Required),
                ("type".to_string(), IssueCode::InvalidValue),
            ]
        );
        assert_eq!(report.warnings()[0].code, IssueCode::LengthWarning);
    }

    #[test]
    fn test_business_profile_required_stops_early() {
        let report = validate_business(&json!({"businessId": "b1"}));
        assert_eq!(codes(&report), vec![("profile".to_string(), IssueCode::Required)]);
    }

    #[test]
    fn test_business_contact_checks() {
        let business = json!({
            "businessId": "b1",
            "ownerId": "u1",
            "profile": {
                "name": "Shea & Co",
                "website": "shea.example",
                "contact": {"email": "hello@shea.example", "phone": "ring ring"}
            }
        });
        let report = validate_business(&business);
        assert_eq!(
            codes(&report),
            vec![("profile.website".to_string(), IssueCode::InvalidFormat)]
        );
        let warnings: Vec<IssueCode> = report.warnings().iter().map(|w| w.code).collect();
        assert_eq!(warnings, vec![IssueCode::Recommended, IssueCode::FormatWarning]);
    }

    #[test]
    fn test_resource_rules() {
        let resource = json!({
            "resourceId": "r1",
            "title": "Guide to rest",
            "description": "d",
            "category": "wellness",
            "author": {"id": "a1"},
            "type": "pamphlet",
            "externalUrl": "https://ok.example",
            "downloadUrl": "file://nope"
        });
        let report = validate_resource(&resource);
        assert_eq!(
            codes(&report),
            vec![
                ("type".to_string(), IssueCode::InvalidValue),
                ("downloadUrl".to_string(), IssueCode::InvalidFormat),
            ]
        );
        assert_eq!(report.warnings()[0].field, "summary");
    }

    #[test]
    fn test_image_scores_are_warnings() {
        let image = json!({
            "imageId": "i1",
            "url": "https://cdn.example/i1.png",
            "altText": "  Portrait  ",
            "category": "hero",
            "status": "active",
            "validation": {"culturalScore": 1.2, "sensitivityScore": 0.5, "inclusivityScore": "high"}
        });
        let report = validate_image_asset(&image);
        assert!(report.is_valid());
        let fields: Vec<&str> = report.warnings().iter().map(|w| w.field.as_str()).collect();
        assert_eq!(fields, vec!["validation.culturalScore", "validation.inclusivityScore"]);
    }

    #[test]
    fn test_image_alt_text_trimmed() {
        let image = json!({
            "imageId": "i1",
            "url": "https://cdn.example/i1.png",
            "altText": "  ab  ",
            "category": "hero"
        });
        assert_eq!(
            codes(&validate_image_asset(&image)),
            vec![("altText".to_string(), IssueCode::MinLength)]
        );
    }

    #[test]
    fn test_feedback_rating() {
        let base = json!({"feedbackId": "f1", "imageId": "i1", "userId": "u1", "categories": []});
        let with_rating = |rating: Value| {
            let mut f = base.clone();
            f["rating"] = rating;
            validate_feedback(&f)
        };
        assert!(with_rating(json!(1)).is_valid());
        assert!(with_rating(json!(5)).is_valid());
        assert_eq!(with_rating(json!(0)).errors()[0].code, IssueCode::RangeError);
        assert_eq!(with_rating(json!(6)).errors()[0].code, IssueCode::RangeError);
        assert_eq!(with_rating(json!("4")).errors()[0].code, IssueCode::RangeError);
        assert_eq!(with_rating(Value::Null).errors()[0].code, IssueCode::Required);
    }

    #[test]
    fn test_feedback_enum_issues_are_warnings() {
        let feedback = json!({
            "feedbackId": "f1", "imageId": "i1", "userId": "u1", "rating": 3,
            "severity": "meh", "status": "lost"
        });
        let report = validate_feedback(&feedback);
        assert!(report.is_valid());
        assert_eq!(report.warnings().len(), 3);
    }

    #[test]
    fn test_incident_priority() {
        let report = validate_incident(&json!({
            "incidentId": "i1", "triggeredBy": "staff", "summary": "s"
        }));
        assert_eq!(report.errors().len(), 1);
        assert_eq!(report.errors()[0].message, "Priority must be p1|p2|p3");

        let report = validate_incident(&json!({
            "incidentId": "i1", "triggeredBy": "aliens", "priority": "p2", "summary": "s"
        }));
        assert_eq!(codes(&report), vec![("triggeredBy".to_string(), IssueCode::InvalidValue)]);
    }

    #[test]
    fn test_advisory_and_premium() {
        let report = validate_advisory_review(&json!({
            "reviewId": "r1", "targetType": "video", "targetId": "t1", "status": "maybe"
        }));
        assert_eq!(codes(&report), vec![("targetType".to_string(), IssueCode::InvalidValue)]);
        assert_eq!(report.warnings()[0].field, "status");

        let report = validate_premium_source(&json!({
            "sourceId": "p1", "provider": "nappy", "displayName": "Nappy", "apiBaseUrl": "api.nappy"
        }));
        assert!(report.is_valid());
        assert_eq!(report.warnings()[0].code, IssueCode::FormatWarning);
    }

    #[test]
    fn test_personalization_engagement() {
        let report = validate_personalization(&json!({
            "userId": "u1", "engagement": {"impressions": -3, "clicks": 2}
        }));
        assert!(report.is_valid());
        assert_eq!(report.warnings().len(), 1);
        assert_eq!(report.warnings()[0].field, "engagement.impressions");
    }

    #[test]
    fn test_dispatch() {
        let report = validate_entity(&json!({"entityType": "CIRCLE", "name": "ab"}));
        assert!(!report.is_valid());

        assert!(validate_entity(&json!({"entityType": "SOMETHING_ELSE"})).is_valid());
        assert!(validate_entity(&json!({})).is_valid());
        assert!(validate_entity(&json!({"entityType": "CIRCLE_MEMBER"})).is_valid());
    }
}
