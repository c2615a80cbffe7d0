//! Entity schemas for madmall-db
//!
//! Every domain entity is a typed attribute shape that knows which key
//! patterns it occupies. Persisting one produces a [`StorageRecord`], the
//! common envelope of the single table.

mod moderation;
mod record;
mod social;

pub use moderation::{
    AdvisoryReview, Engagement, Feedback, FeedbackSeverity, FeedbackStatus, ImageAsset,
    ImageSource, ImageStatus, ImageValidation, Incident, IncidentPriority, IncidentStatus,
    IncidentTrigger, PersonalizationProfile, PremiumProvider, PremiumSource, ReviewStatus,
    ReviewTarget,
};
pub use record::{EntityMetadata, EntityType, StorageRecord};
pub use social::{
    Business, BusinessContact, BusinessProfile, Circle, CircleMember, CircleSettings, Resource,
    ResourceAuthor, ResourceMetadata, Story, StoryAuthor, StoryMetadata, User, UserPreferences,
    UserProfile, UserSettings,
};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::keys::{iso_timestamp, KeyAttr, KeyAttributes};

/// Tenant used when a record carries none
pub const DEFAULT_TENANT: &str = "default";

#[derive(Debug, Error)]
pub enum EntityError {
    #[error("{entity_type} record is missing key attribute {attr}")]
    MissingKey { entity_type: EntityType, attr: KeyAttr },

    #[error("{0} did not serialize to an attribute map")]
    NotAnObject(EntityType),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Inputs to key derivation that are not part of the entity's own fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyContext {
    pub created_at: String,
    pub updated_at: String,
    pub tenant_id: Option<String>,
}

impl KeyContext {
    /// A context for a record created and last updated at `at`
    pub fn at(at: DateTime<Utc>) -> Self {
        let ts = iso_timestamp(at);
        Self {
            created_at: ts.clone(),
            updated_at: ts,
            tenant_id: None,
        }
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn with_updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = iso_timestamp(at);
        self
    }

    /// The context a stored record was keyed with
    pub fn of(record: &StorageRecord) -> Self {
        Self {
            created_at: record.created_at.clone(),
            updated_at: record.updated_at.clone(),
            tenant_id: record.metadata().tenant_id,
        }
    }

    pub fn tenant(&self) -> &str {
        self.tenant_id.as_deref().unwrap_or(DEFAULT_TENANT)
    }
}

/// A typed domain entity stored in the single table
pub trait Entity: Serialize + DeserializeOwned {
    const ENTITY_TYPE: EntityType;

    /// Full key set of this entity: primary key plus every index projection
    fn keys(&self, ctx: &KeyContext) -> KeyAttributes;

    /// Builds the version 1 storage record for this entity
    fn to_record(&self, ctx: &KeyContext) -> Result<StorageRecord, EntityError> {
        let keys = self.keys(ctx);
        let (pk, sk) = match (keys.get(KeyAttr::Pk), keys.get(KeyAttr::Sk)) {
            (Some(pk), Some(sk)) => (pk.to_string(), sk.to_string()),
            (None, _) => return Err(missing(Self::ENTITY_TYPE, KeyAttr::Pk)),
            (_, None) => return Err(missing(Self::ENTITY_TYPE, KeyAttr::Sk)),
        };

        let mut attributes = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => return Err(EntityError::NotAnObject(Self::ENTITY_TYPE)),
        };
        if let Some(tenant) = &ctx.tenant_id {
            attributes.insert("tenantId".into(), Value::String(tenant.clone()));
        }

        let mut record = StorageRecord::new(pk, sk, Self::ENTITY_TYPE.as_str(), Utc::now())
            .with_keys(&keys)
            .with_attributes(attributes);
        record.created_at = ctx.created_at.clone();
        record.updated_at = ctx.updated_at.clone();
        Ok(record)
    }

    /// Decodes a stored record of this entity type
    fn from_record(record: &StorageRecord) -> Result<Self, EntityError> {
        Ok(record.decode()?)
    }
}

fn missing(entity_type: EntityType, attr: KeyAttr) -> EntityError {
    EntityError::MissingKey { entity_type, attr }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ctx() -> KeyContext {
        KeyContext::at(Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap())
    }

    fn user() -> User {
        User {
            user_id: "u1".into(),
            email: "a@b.com".into(),
            profile: UserProfile {
                first_name: "Ada".into(),
                last_name: "Moss".into(),
                ..Default::default()
            },
            is_active: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_user_record_keys() {
        let record = user().to_record(&ctx()).unwrap();
        assert_eq!(record.pk, "USER#u1");
        assert_eq!(record.sk, "PROFILE");
        assert_eq!(record.gsi1pk.as_deref(), Some("EMAIL#a@b.com"));
        assert_eq!(record.gsi1sk.as_deref(), Some("USER#u1"));
        assert_eq!(record.gsi4pk.as_deref(), Some("TENANT#default#USERS"));
        assert_eq!(
            record.gsi4sk.as_deref(),
            Some("CREATED#2024-01-15T08:00:00.000Z")
        );
        assert_eq!(record.entity_type, "USER");
        assert_eq!(record.version, 1);
        assert_eq!(record.created_at, "2024-01-15T08:00:00.000Z");
    }

    #[test]
    fn test_record_round_trips_entity() {
        let original = user();
        let record = original.to_record(&ctx().with_tenant("acme")).unwrap();
        assert_eq!(record.gsi4pk.as_deref(), Some("TENANT#acme#USERS"));
        assert_eq!(record.metadata().tenant_id.as_deref(), Some("acme"));

        let decoded = User::from_record(&record).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(decoded.keys(&KeyContext::of(&record)), record.keys());
    }

    #[test]
    fn test_key_derivation_is_deterministic() {
        let a = user().keys(&ctx());
        let b = user().keys(&ctx());
        assert_eq!(a, b);
    }

    #[test]
    fn test_member_and_mirror() {
        let member = CircleMember {
            circle_id: "c1".into(),
            user_id: "u1".into(),
            role: "member".into(),
            status: "active".into(),
            joined_at: "2024-01-15T08:00:00.000Z".into(),
            ..Default::default()
        };
        let forward = member.to_record(&ctx()).unwrap();
        assert_eq!(forward.primary_key(), ("CIRCLE#c1", "MEMBER#u1"));
        assert_eq!(forward.gsi3pk.as_deref(), Some("MEMBER_STATUS#active"));
        assert_eq!(
            forward.gsi3sk.as_deref(),
            Some("JOINED#2024-01-15T08:00:00.000Z")
        );

        let mirror = member.mirror_keys();
        assert_eq!(mirror.get(KeyAttr::Pk), Some("USER#u1"));
        assert_eq!(mirror.get(KeyAttr::Sk), Some("CIRCLE#c1"));
    }

    #[test]
    fn test_story_projections() {
        let story = Story {
            story_id: "s1".into(),
            title: "A long journey".into(),
            author: StoryAuthor {
                id: "u9".into(),
                ..Default::default()
            },
            status: "published".into(),
            ..Default::default()
        };
        let keys = story.keys(&ctx());
        assert_eq!(keys.get(KeyAttr::Gsi1Pk), Some("AUTHOR#u9"));
        assert_eq!(keys.get(KeyAttr::Gsi2Pk), Some("STORY_FEED"));
        assert_eq!(keys.get(KeyAttr::Gsi3Pk), Some("STORY_STATUS#PUBLISHED"));
        assert!(keys.get(KeyAttr::Gsi2Sk).unwrap().starts_with("CREATED#"));
    }

    #[test]
    fn test_type_attribute_renamed() {
        let circle = Circle {
            circle_id: "c1".into(),
            circle_type: "support_group".into(),
            status: "active".into(),
            ..Default::default()
        };
        let record = circle.to_record(&ctx()).unwrap();
        assert_eq!(record.attributes["type"], "support_group");
        assert_eq!(record.gsi1pk.as_deref(), Some("CIRCLE_TYPE#support_group"));
        assert_eq!(record.gsi3pk.as_deref(), Some("CIRCLE_STATUS#ACTIVE"));
    }
}
