//! Community entities: users, circles, members, stories, businesses, resources

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Entity, KeyContext};
use crate::entity::EntityType;
use crate::keys::segment::{created, joined, segment, updated};
use crate::keys::{KeyAttr, KeyAttributes, KeyPatterns};

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub cultural_background: Vec<String>,
    #[serde(default)]
    pub communication_style: String,
    #[serde(default)]
    pub diagnosis_stage: String,
    #[serde(default)]
    pub support_needs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default)]
    pub join_date: String,
    #[serde(default)]
    pub last_active: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub profile_visibility: String,
    pub show_real_name: bool,
    pub allow_direct_messages: bool,
    pub share_health_journey: bool,
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub weekly_digest: bool,
    pub circle_notifications: bool,
    #[serde(default)]
    pub content_preferences: Vec<String>,
    #[serde(default)]
    pub circle_interests: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessibility {
    pub high_contrast: bool,
    pub large_text: bool,
    pub screen_reader: bool,
    pub reduced_motion: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    /// light | dark | auto
    pub theme: String,
    pub language: String,
    pub timezone: String,
    #[serde(default)]
    pub accessibility: Accessibility,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub stories_shared: u64,
    pub circles_joined: u64,
    pub comments_posted: u64,
    pub helpful_votes: u64,
    pub days_active: u64,
    pub streak_days: u64,
}

/// PK = USER#{userId}, SK = PROFILE; email lookup on GSI1; tenant on GSI4
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub email: String,
    pub profile: UserProfile,
    pub preferences: UserPreferences,
    pub settings: UserSettings,
    #[serde(default)]
    pub primary_goals: Vec<String>,
    pub is_verified: bool,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<UserStats>,
}

impl Entity for User {
    const ENTITY_TYPE: EntityType = EntityType::User;

    fn keys(&self, ctx: &KeyContext) -> KeyAttributes {
        KeyPatterns::user_profile(&self.user_id)
            .merge(KeyPatterns::user_by_email(&self.email, &self.user_id))
            .merge(KeyPatterns::tenant_users(ctx.tenant()))
            .with(KeyAttr::Gsi4Sk, created(&ctx.created_at))
    }
}

// =============================================================================
// Circles
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingSchedule {
    pub frequency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleSettings {
    pub is_private: bool,
    pub require_approval: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_members: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultural_focus: Option<Vec<String>>,
    pub allow_guest_posts: bool,
    /// light | moderate | strict
    pub moderation_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_guidelines: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_schedule: Option<MeetingSchedule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleStats {
    pub member_count: u64,
    pub active_members: u64,
    pub posts_this_week: u64,
    pub posts_this_month: u64,
    pub engagement_rate: f64,
    pub average_response_time: f64,
}

/// PK = CIRCLE#{circleId}, SK = METADATA; type on GSI1, status on GSI3, tenant on GSI4
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    pub circle_id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub circle_type: String,
    pub privacy_level: String,
    pub settings: CircleSettings,
    #[serde(default)]
    pub moderators: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub stats: CircleStats,
    pub created_by: String,
    pub is_active: bool,
    pub status: String,
}

impl Entity for Circle {
    const ENTITY_TYPE: EntityType = EntityType::Circle;

    fn keys(&self, ctx: &KeyContext) -> KeyAttributes {
        KeyPatterns::circle_metadata(&self.circle_id)
            .merge(KeyPatterns::circles_by_type(&self.circle_type))
            .with(KeyAttr::Gsi1Sk, created(&ctx.created_at))
            .merge(KeyPatterns::circles_by_status(&self.status))
            .with(KeyAttr::Gsi3Sk, updated(&ctx.updated_at))
            .merge(KeyPatterns::tenant_circles(ctx.tenant()))
            .with(KeyAttr::Gsi4Sk, created(&ctx.created_at))
    }
}

/// Membership edge. The forward record lives in the circle partition;
/// [`CircleMember::mirror_keys`] gives the user-partition copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleMember {
    pub circle_id: String,
    pub user_id: String,
    pub role: String,
    pub status: String,
    pub joined_at: String,
    pub last_active: String,
    pub contribution_score: f64,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CircleMember {
    fn status_keys(&self) -> KeyAttributes {
        KeyPatterns::members_by_status(&self.status).with(KeyAttr::Gsi3Sk, joined(&self.joined_at))
    }

    /// Keys of the inverse record (PK = USER#{userId}, SK = CIRCLE#{circleId})
    pub fn mirror_keys(&self) -> KeyAttributes {
        KeyPatterns::member_circle(&self.user_id, &self.circle_id).merge(self.status_keys())
    }
}

impl Entity for CircleMember {
    const ENTITY_TYPE: EntityType = EntityType::CircleMember;

    fn keys(&self, _ctx: &KeyContext) -> KeyAttributes {
        KeyPatterns::circle_member(&self.circle_id, &self.user_id).merge(self.status_keys())
    }
}

// =============================================================================
// Stories
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryAuthor {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub is_verified: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryEngagement {
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub saves: u64,
    pub views: u64,
    pub helpful_votes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryMetadata {
    pub read_time: u32,
    pub word_count: u32,
    #[serde(default)]
    pub cultural_elements: Vec<String>,
    #[serde(default)]
    pub therapeutic_value: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_warnings: Option<Vec<String>>,
    pub age_appropriate: bool,
}

/// PK = STORY#{storyId}, SK = METADATA; author on GSI1, feed on GSI2, status on GSI3
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub story_id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    pub author: StoryAuthor,
    #[serde(rename = "type")]
    pub story_type: String,
    pub status: String,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circle_id: Option<String>,
    #[serde(default)]
    pub engagement: StoryEngagement,
    pub metadata: StoryMetadata,
    pub moderation_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderation_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

impl Entity for Story {
    const ENTITY_TYPE: EntityType = EntityType::Story;

    fn keys(&self, ctx: &KeyContext) -> KeyAttributes {
        let created_token = created(&ctx.created_at);
        KeyPatterns::story_metadata(&self.story_id)
            .merge(KeyPatterns::stories_by_author(&self.author.id))
            .with(KeyAttr::Gsi1Sk, created_token.clone())
            .merge(KeyPatterns::story_feed())
            .with(KeyAttr::Gsi2Sk, created_token.clone())
            .merge(KeyPatterns::stories_by_status(&self.status))
            .with(KeyAttr::Gsi3Sk, created_token)
    }
}

// =============================================================================
// Businesses
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessContact {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfile {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub founded_year: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub founder_story: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default)]
    pub social_media: BTreeMap<String, String>,
    pub contact: BusinessContact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub gallery: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessMetrics {
    pub rating: f64,
    pub review_count: u64,
    pub trust_score: f64,
    pub response_rate: f64,
    pub average_response_time: f64,
    pub repeat_customer_rate: f64,
}

/// PK = BUSINESS#{businessId}, SK = METADATA; category on GSI1, status on GSI3
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub business_id: String,
    pub profile: BusinessProfile,
    #[serde(rename = "type")]
    pub business_type: String,
    pub status: String,
    /// Listing category, used for the GSI1 projection
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub services_offered: Vec<String>,
    #[serde(default)]
    pub target_audience: Vec<String>,
    #[serde(default)]
    pub cultural_competencies: Vec<String>,
    #[serde(default)]
    pub metrics: BusinessMetrics,
    pub owner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_until: Option<String>,
}

impl Entity for Business {
    const ENTITY_TYPE: EntityType = EntityType::Business;

    fn keys(&self, ctx: &KeyContext) -> KeyAttributes {
        let category = if self.category.is_empty() { "general" } else { &self.category };
        KeyPatterns::business_metadata(&self.business_id)
            .merge(KeyPatterns::businesses_by_category(category))
            .with(KeyAttr::Gsi1Sk, segment("NAME", &self.profile.name))
            .merge(KeyPatterns::businesses_by_status(&self.status))
            .with(KeyAttr::Gsi3Sk, updated(&ctx.updated_at))
    }
}

// =============================================================================
// Resources
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAuthor {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub is_verified: bool,
    #[serde(default)]
    pub specialties: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listen_time: Option<u32>,
    pub difficulty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerequisites: Option<Vec<String>>,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub cultural_considerations: Vec<String>,
    #[serde(default)]
    pub therapeutic_value: Vec<String>,
    pub evidence_based: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEngagement {
    pub views: u64,
    pub likes: u64,
    pub saves: u64,
    pub shares: u64,
    pub helpful_votes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completions: Option<u64>,
    pub average_rating: f64,
    pub rating_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub attachment_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub amount: f64,
    pub currency: String,
}

/// PK = RESOURCE#{resourceId}, SK = METADATA; type on GSI1, category on GSI2,
/// status on GSI3, tenant on GSI4
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub resource_id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub summary: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub category: String,
    #[serde(default)]
    pub subcategories: Vec<String>,
    pub status: String,
    pub author: ResourceAuthor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributors: Option<Vec<ResourceAuthor>>,
    pub metadata: ResourceMetadata,
    #[serde(default)]
    pub engagement: ResourceEngagement,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub related_resources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
    pub is_public: bool,
    pub is_premium: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

impl Entity for Resource {
    const ENTITY_TYPE: EntityType = EntityType::Resource;

    fn keys(&self, ctx: &KeyContext) -> KeyAttributes {
        KeyPatterns::resource_metadata(&self.resource_id)
            .merge(KeyPatterns::resources_by_type(&self.resource_type))
            .with(KeyAttr::Gsi1Sk, created(&ctx.created_at))
            .merge(KeyPatterns::resources_by_category(&self.category))
            .with(KeyAttr::Gsi2Sk, segment("TITLE", &self.title))
            .merge(KeyPatterns::resources_by_status(&self.status))
            .with(KeyAttr::Gsi3Sk, updated(&ctx.updated_at))
            .merge(KeyPatterns::tenant_resources(ctx.tenant()))
            .with(KeyAttr::Gsi4Sk, created(&ctx.created_at))
    }
}
