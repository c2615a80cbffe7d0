//! The storage envelope shared by every entity
//!
//! Every persisted object, whatever its domain meaning, is one
//! `StorageRecord`: key slots, a type discriminator, an optimistic
//! concurrency version, timestamps, an optional ttl and the domain
//! attributes flattened next to them.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::keys::{iso_timestamp, KeyAttr, KeyAttributes};

/// Entity type discriminators as stored in `entityType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    User,
    Circle,
    CircleMember,
    Story,
    Business,
    Resource,
    #[serde(rename = "IMAGE")]
    ImageAsset,
    Feedback,
    Incident,
    AdvisoryReview,
    PremiumSource,
    Personalization,
}

impl EntityType {
    pub const ALL: [EntityType; 12] = [
        EntityType::User,
        EntityType::Circle,
        EntityType::CircleMember,
        EntityType::Story,
        EntityType::Business,
        EntityType::Resource,
        EntityType::ImageAsset,
        EntityType::Feedback,
        EntityType::Incident,
        EntityType::AdvisoryReview,
        EntityType::PremiumSource,
        EntityType::Personalization,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::User => "USER",
            EntityType::Circle => "CIRCLE",
            EntityType::CircleMember => "CIRCLE_MEMBER",
            EntityType::Story => "STORY",
            EntityType::Business => "BUSINESS",
            EntityType::Resource => "RESOURCE",
            EntityType::ImageAsset => "IMAGE",
            EntityType::Feedback => "FEEDBACK",
            EntityType::Incident => "INCIDENT",
            EntityType::AdvisoryReview => "ADVISORY_REVIEW",
            EntityType::PremiumSource => "PREMIUM_SOURCE",
            EntityType::Personalization => "PERSONALIZATION",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One physical item of the single table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageRecord {
    #[serde(rename = "PK")]
    pub pk: String,
    #[serde(rename = "SK")]
    pub sk: String,
    #[serde(rename = "GSI1PK", default, skip_serializing_if = "Option::is_none")]
    pub gsi1pk: Option<String>,
    #[serde(rename = "GSI1SK", default, skip_serializing_if = "Option::is_none")]
    pub gsi1sk: Option<String>,
    #[serde(rename = "GSI2PK", default, skip_serializing_if = "Option::is_none")]
    pub gsi2pk: Option<String>,
    #[serde(rename = "GSI2SK", default, skip_serializing_if = "Option::is_none")]
    pub gsi2sk: Option<String>,
    #[serde(rename = "GSI3PK", default, skip_serializing_if = "Option::is_none")]
    pub gsi3pk: Option<String>,
    #[serde(rename = "GSI3SK", default, skip_serializing_if = "Option::is_none")]
    pub gsi3sk: Option<String>,
    #[serde(rename = "GSI4PK", default, skip_serializing_if = "Option::is_none")]
    pub gsi4pk: Option<String>,
    #[serde(rename = "GSI4SK", default, skip_serializing_if = "Option::is_none")]
    pub gsi4sk: Option<String>,
    #[serde(rename = "entityType")]
    pub entity_type: String,
    /// Optimistic concurrency version, starts at 1
    pub version: u64,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    /// Absolute expiry in epoch seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
    /// Domain attributes
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl StorageRecord {
    /// Creates a version 1 record with both timestamps set to `at`
    pub fn new(
        pk: impl Into<String>,
        sk: impl Into<String>,
        entity_type: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        let ts = iso_timestamp(at);
        Self {
            pk: pk.into(),
            sk: sk.into(),
            gsi1pk: None,
            gsi1sk: None,
            gsi2pk: None,
            gsi2sk: None,
            gsi3pk: None,
            gsi3sk: None,
            gsi4pk: None,
            gsi4sk: None,
            entity_type: entity_type.into(),
            version: 1,
            created_at: ts.clone(),
            updated_at: ts,
            ttl: None,
            attributes: Map::new(),
        }
    }

    /// Applies every populated slot of `keys`, primary slots included
    pub fn with_keys(mut self, keys: &KeyAttributes) -> Self {
        for (attr, value) in keys.iter() {
            let value = value.to_string();
            match attr {
                KeyAttr::Pk => self.pk = value,
                KeyAttr::Sk => self.sk = value,
                KeyAttr::Gsi1Pk => self.gsi1pk = Some(value),
                KeyAttr::Gsi1Sk => self.gsi1sk = Some(value),
                KeyAttr::Gsi2Pk => self.gsi2pk = Some(value),
                KeyAttr::Gsi2Sk => self.gsi2sk = Some(value),
                KeyAttr::Gsi3Pk => self.gsi3pk = Some(value),
                KeyAttr::Gsi3Sk => self.gsi3sk = Some(value),
                KeyAttr::Gsi4Pk => self.gsi4pk = Some(value),
                KeyAttr::Gsi4Sk => self.gsi4sk = Some(value),
            }
        }
        self
    }

    pub fn with_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_ttl(mut self, ttl: i64) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Current key tuple
    pub fn keys(&self) -> KeyAttributes {
        KeyAttributes {
            pk: Some(self.pk.clone()),
            sk: Some(self.sk.clone()),
            gsi1pk: self.gsi1pk.clone(),
            gsi1sk: self.gsi1sk.clone(),
            gsi2pk: self.gsi2pk.clone(),
            gsi2sk: self.gsi2sk.clone(),
            gsi3pk: self.gsi3pk.clone(),
            gsi3sk: self.gsi3sk.clone(),
            gsi4pk: self.gsi4pk.clone(),
            gsi4sk: self.gsi4sk.clone(),
        }
    }

    /// Primary identity
    pub fn primary_key(&self) -> (&str, &str) {
        (&self.pk, &self.sk)
    }

    /// Records a mutation: bumps the version and refreshes `updatedAt`.
    ///
    /// The caller must persist with a condition on the version it read
    /// (see [`crate::query::VersionedUpdate`]).
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = iso_timestamp(at);
    }

    /// Returns true once the ttl has elapsed
    pub fn is_expired(&self, now_epoch_secs: i64) -> bool {
        matches!(self.ttl, Some(ttl) if ttl < now_epoch_secs)
    }

    pub fn metadata(&self) -> EntityMetadata {
        let text = |name: &str| {
            self.attributes
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        EntityMetadata {
            entity_type: self.entity_type.clone(),
            version: self.version,
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
            created_by: text("createdBy"),
            updated_by: text("updatedBy"),
            tenant_id: text("tenantId"),
        }
    }

    /// Decodes the domain attributes into a typed entity
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.attributes.clone()))
    }

    pub fn to_value(&self) -> Value {
        // Serializing plain strings, numbers and a JSON map cannot fail
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// Envelope view without keys or domain attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetadata {
    pub entity_type: String,
    pub version: u64,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}
