//! Image, cultural-moderation and personalization entities

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::{Entity, KeyContext};
use crate::entity::EntityType;
use crate::keys::segment::{created, updated};
use crate::keys::{KeyAttr, KeyAttributes, KeyPatterns};

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }
    };
}

string_enum!(
    /// Lifecycle of an image asset
    ImageStatus {
        Active => "active",
        Archived => "archived",
        Flagged => "flagged",
        Removed => "removed",
        PendingReview => "pending_review",
    }
);

string_enum!(ImageSource {
    Generated => "generated",
    Premium => "premium",
    UserUpload => "user_upload",
    Stock => "stock",
});

string_enum!(FeedbackSeverity {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

string_enum!(FeedbackStatus {
    New => "new",
    Acknowledged => "acknowledged",
    InReview => "in_review",
    Resolved => "resolved",
    Dismissed => "dismissed",
});

string_enum!(IncidentTrigger {
    CommunityReport => "community_report",
    AutomatedDetection => "automated_detection",
    Staff => "staff",
    AdvisoryBoard => "advisory_board",
});

string_enum!(IncidentStatus {
    Open => "open",
    Investigating => "investigating",
    Mitigated => "mitigated",
    Closed => "closed",
});

string_enum!(
    /// p1 is the most urgent
    IncidentPriority {
        P1 => "p1",
        P2 => "p2",
        P3 => "p3",
    }
);

string_enum!(ReviewTarget {
    Image => "image",
    Resource => "resource",
    Story => "story",
});

string_enum!(ReviewStatus {
    Queued => "queued",
    InReview => "in_review",
    Approved => "approved",
    ChangesRequested => "changes_requested",
    Rejected => "rejected",
});

string_enum!(PremiumProvider {
    CreateHer => "createher",
    Nappy => "nappy",
    Other => "other",
});

// =============================================================================
// Images
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
}

/// Scores in 0..=1 produced by cultural validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageValidation {
    pub cultural_score: f64,
    pub sensitivity_score: f64,
    pub inclusivity_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_validated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUsage {
    #[serde(default)]
    pub contexts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_impressions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_clicks: Option<u64>,
}

/// PK = IMAGE#{imageId}, SK = METADATA; category on GSI1, status on GSI3
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAsset {
    pub image_id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub alt_text: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub source: ImageSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_info: Option<SourceInfo>,
    pub status: ImageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ImageValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<ImageUsage>,
}

impl Entity for ImageAsset {
    const ENTITY_TYPE: EntityType = EntityType::ImageAsset;

    fn keys(&self, ctx: &KeyContext) -> KeyAttributes {
        KeyPatterns::image_metadata(&self.image_id)
            .merge(KeyPatterns::images_by_category(&self.category))
            .with(KeyAttr::Gsi1Sk, created(&ctx.created_at))
            .merge(KeyPatterns::image_status(self.status.as_str()))
            .with(KeyAttr::Gsi3Sk, updated(&ctx.updated_at))
    }
}

// =============================================================================
// Feedback, incidents and advisory review
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<String>,
    /// removed | replaced | edited | no_action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partitioned per image: PK = FEEDBACK#IMAGE#{imageId}, SK = USER#{userId}#TS#{createdAt}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub feedback_id: String,
    pub image_id: String,
    pub user_id: String,
    /// 1..=5
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<FeedbackSeverity>,
    pub is_report: bool,
    pub status: FeedbackStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl Entity for Feedback {
    const ENTITY_TYPE: EntityType = EntityType::Feedback;

    fn keys(&self, ctx: &KeyContext) -> KeyAttributes {
        let keys = KeyPatterns::feedback_for_image(&self.image_id, &self.user_id, &ctx.created_at);
        match self.severity {
            Some(severity) => keys
                .merge(KeyPatterns::feedback_by_severity(severity.as_str()))
                .with(KeyAttr::Gsi3Sk, created(&ctx.created_at)),
            None => keys,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Escalation {
    /// 0..=3
    pub level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_call_notified_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisory_board_notified_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comms_sent_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(rename = "type")]
    pub alert_type: String,
    pub sent_at: String,
    /// email | slack | sms | webhook
    pub channel: String,
}

/// PK = INCIDENT#{incidentId}, SK = METADATA;
/// GSI3 orders open incidents by priority, then creation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub incident_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_image_id: Option<String>,
    pub triggered_by: IncidentTrigger,
    pub status: IncidentStatus,
    pub priority: IncidentPriority,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation: Option<Escalation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerts: Option<Vec<Alert>>,
}

impl Entity for Incident {
    const ENTITY_TYPE: EntityType = EntityType::Incident;

    fn keys(&self, ctx: &KeyContext) -> KeyAttributes {
        KeyPatterns::incident_metadata(&self.incident_id)
            .merge(KeyPatterns::incident_status(self.status.as_str()))
            .merge(KeyPatterns::incident_priority_sort(
                self.priority.as_str(),
                &ctx.created_at,
            ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDecision {
    pub reviewer_id: String,
    /// approve | request_changes | reject
    pub decision: String,
    pub rationale: String,
    pub decided_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consensus {
    pub score: f64,
    pub required_votes: u32,
    pub received_votes: u32,
}

/// All reviews share the ADVISORY#QUEUE partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryReview {
    pub review_id: String,
    pub target_type: ReviewTarget,
    pub target_id: String,
    pub submitted_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub status: ReviewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decisions: Option<Vec<ReviewDecision>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consensus: Option<Consensus>,
}

impl Entity for AdvisoryReview {
    const ENTITY_TYPE: EntityType = EntityType::AdvisoryReview;

    fn keys(&self, ctx: &KeyContext) -> KeyAttributes {
        KeyPatterns::advisory_queue(&self.review_id)
            .merge(KeyPatterns::advisory_by_target(
                self.target_type.as_str(),
                &self.target_id,
            ))
            .with(KeyAttr::Gsi1Sk, created(&ctx.created_at))
            .merge(KeyPatterns::advisory_by_status(self.status.as_str()))
            .with(KeyAttr::Gsi3Sk, updated(&ctx.updated_at))
    }
}

// =============================================================================
// Premium sources and personalization
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseDefaults {
    pub license_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_restrictions: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumSource {
    pub source_id: String,
    pub provider: PremiumProvider,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    /// Reference to a secret, never the key itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_arn: Option<String>,
    pub license_defaults: LicenseDefaults,
    /// active | inactive
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_threshold: Option<f64>,
}

impl Entity for PremiumSource {
    const ENTITY_TYPE: EntityType = EntityType::PremiumSource;

    fn keys(&self, ctx: &KeyContext) -> KeyAttributes {
        KeyPatterns::premium_source_metadata(&self.source_id)
            .merge(KeyPatterns::premium_by_provider(self.provider.as_str()))
            .with(KeyAttr::Gsi1Sk, created(&ctx.created_at))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_styles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avoid_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_contexts: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Engagement {
    pub impressions: i64,
    pub clicks: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dwell_time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_interaction_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbTest {
    pub experiment_id: String,
    /// A | B | C
    pub variant: String,
    pub started_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<BTreeMap<String, f64>>,
}

/// Lives in the user's partition next to the profile (SK = PERSONALIZATION).
/// Indexed on GSI1 by its first cohort, if any.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizationProfile {
    pub user_id: String,
    #[serde(default)]
    pub preferences: ImagePreferences,
    #[serde(default)]
    pub engagement: Engagement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ab_tests: Option<Vec<AbTest>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cohorts: Option<Vec<String>>,
}

impl Entity for PersonalizationProfile {
    const ENTITY_TYPE: EntityType = EntityType::Personalization;

    fn keys(&self, ctx: &KeyContext) -> KeyAttributes {
        let keys = KeyPatterns::personalization_profile(&self.user_id);
        match self.cohorts.as_ref().and_then(|c| c.first()) {
            Some(cohort) => keys
                .merge(KeyPatterns::personalization_by_cohort(cohort))
                .with(KeyAttr::Gsi1Sk, updated(&ctx.updated_at)),
            None => keys,
        }
    }
}
