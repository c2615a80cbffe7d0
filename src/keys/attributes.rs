//! Key attribute slots of the single table
//!
//! Every record carries a primary key (PK, SK) and up to four secondary
//! index projections. GSI4 is reserved for tenant-scoped listing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One key attribute slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyAttr {
    Pk,
    Sk,
    Gsi1Pk,
    Gsi1Sk,
    Gsi2Pk,
    Gsi2Sk,
    Gsi3Pk,
    Gsi3Sk,
    Gsi4Pk,
    Gsi4Sk,
}

impl KeyAttr {
    /// All slots in table order
    pub const ALL: [KeyAttr; 10] = [
        KeyAttr::Pk,
        KeyAttr::Sk,
        KeyAttr::Gsi1Pk,
        KeyAttr::Gsi1Sk,
        KeyAttr::Gsi2Pk,
        KeyAttr::Gsi2Sk,
        KeyAttr::Gsi3Pk,
        KeyAttr::Gsi3Sk,
        KeyAttr::Gsi4Pk,
        KeyAttr::Gsi4Sk,
    ];

    /// Physical attribute name as stored
    pub fn name(&self) -> &'static str {
        match self {
            KeyAttr::Pk => "PK",
            KeyAttr::Sk => "SK",
            KeyAttr::Gsi1Pk => "GSI1PK",
            KeyAttr::Gsi1Sk => "GSI1SK",
            KeyAttr::Gsi2Pk => "GSI2PK",
            KeyAttr::Gsi2Sk => "GSI2SK",
            KeyAttr::Gsi3Pk => "GSI3PK",
            KeyAttr::Gsi3Sk => "GSI3SK",
            KeyAttr::Gsi4Pk => "GSI4PK",
            KeyAttr::Gsi4Sk => "GSI4SK",
        }
    }

    /// Looks up a slot by its physical attribute name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|attr| attr.name() == name)
    }

    /// Returns true for the two primary key slots
    pub fn is_primary(&self) -> bool {
        matches!(self, KeyAttr::Pk | KeyAttr::Sk)
    }
}

impl fmt::Display for KeyAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Global secondary indexes of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Index {
    Gsi1,
    Gsi2,
    Gsi3,
    /// Tenant index
    Gsi4,
}

impl Index {
    pub fn name(&self) -> &'static str {
        match self {
            Index::Gsi1 => "GSI1",
            Index::Gsi2 => "GSI2",
            Index::Gsi3 => "GSI3",
            Index::Gsi4 => "GSI4",
        }
    }

    /// Partition key slot of this index
    pub fn partition_attr(&self) -> KeyAttr {
        match self {
            Index::Gsi1 => KeyAttr::Gsi1Pk,
            Index::Gsi2 => KeyAttr::Gsi2Pk,
            Index::Gsi3 => KeyAttr::Gsi3Pk,
            Index::Gsi4 => KeyAttr::Gsi4Pk,
        }
    }

    /// Sort key slot of this index
    pub fn sort_attr(&self) -> KeyAttr {
        match self {
            Index::Gsi1 => KeyAttr::Gsi1Sk,
            Index::Gsi2 => KeyAttr::Gsi2Sk,
            Index::Gsi3 => KeyAttr::Gsi3Sk,
            Index::Gsi4 => KeyAttr::Gsi4Sk,
        }
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A partial key tuple produced by one key pattern.
///
/// An entity's full key set is the union of several pattern outputs,
/// built with [`KeyAttributes::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyAttributes {
    #[serde(rename = "PK", default, skip_serializing_if = "Option::is_none")]
    pub pk: Option<String>,
    #[serde(rename = "SK", default, skip_serializing_if = "Option::is_none")]
    pub sk: Option<String>,
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
}

impl KeyAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a slot and returns self
    pub fn with(mut self, attr: KeyAttr, value: impl Into<String>) -> Self {
        self.set(attr, value);
        self
    }

    pub fn get(&self, attr: KeyAttr) -> Option<&str> {
        match attr {
            KeyAttr::Pk => self.pk.as_deref(),
            KeyAttr::Sk => self.sk.as_deref(),
            KeyAttr::Gsi1Pk => self.gsi1pk.as_deref(),
            KeyAttr::Gsi1Sk => self.gsi1sk.as_deref(),
            KeyAttr::Gsi2Pk => self.gsi2pk.as_deref(),
            KeyAttr::Gsi2Sk => self.gsi2sk.as_deref(),
            KeyAttr::Gsi3Pk => self.gsi3pk.as_deref(),
            KeyAttr::Gsi3Sk => self.gsi3sk.as_deref(),
            KeyAttr::Gsi4Pk => self.gsi4pk.as_deref(),
            KeyAttr::Gsi4Sk => self.gsi4sk.as_deref(),
        }
    }

    pub fn set(&mut self, attr: KeyAttr, value: impl Into<String>) {
        *self.slot_mut(attr) = Some(value.into());
    }

    fn slot_mut(&mut self, attr: KeyAttr) -> &mut Option<String> {
        match attr {
            KeyAttr::Pk => &mut self.pk,
            KeyAttr::Sk => &mut self.sk,
            KeyAttr::Gsi1Pk => &mut self.gsi1pk,
            KeyAttr::Gsi1Sk => &mut self.gsi1sk,
            KeyAttr::Gsi2Pk => &mut self.gsi2pk,
            KeyAttr::Gsi2Sk => &mut self.gsi2sk,
            KeyAttr::Gsi3Pk => &mut self.gsi3pk,
            KeyAttr::Gsi3Sk => &mut self.gsi3sk,
            KeyAttr::Gsi4Pk => &mut self.gsi4pk,
            KeyAttr::Gsi4Sk => &mut self.gsi4sk,
        }
    }

    /// Unions two pattern outputs. Slots set in `other` win.
    pub fn merge(mut self, other: KeyAttributes) -> Self {
        for attr in KeyAttr::ALL {
            if let Some(value) = other.get(attr) {
                self.set(attr, value);
            }
        }
        self
    }

    /// Iterates over populated slots in table order
    pub fn iter(&self) -> impl Iterator<Item = (KeyAttr, &str)> + '_ {
        KeyAttr::ALL
            .into_iter()
            .filter_map(move |attr| self.get(attr).map(|v| (attr, v)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_unions_slots() {
        let primary = KeyAttributes::new()
            .with(KeyAttr::Pk, "USER#1")
            .with(KeyAttr::Sk, "PROFILE");
        let gsi = KeyAttributes::new().with(KeyAttr::Gsi1Pk, "EMAIL#a@b.com");

        let merged = primary.merge(gsi);
        assert_eq!(merged.get(KeyAttr::Pk), Some("USER#1"));
        assert_eq!(merged.get(KeyAttr::Gsi1Pk), Some("EMAIL#a@b.com"));
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_merge_right_side_wins() {
        let left = KeyAttributes::new().with(KeyAttr::Sk, "A");
        let right = KeyAttributes::new().with(KeyAttr::Sk, "B");
        assert_eq!(left.merge(right).get(KeyAttr::Sk), Some("B"));
    }

    #[test]
    fn test_serializes_physical_names_only_when_set() {
        let keys = KeyAttributes::new()
            .with(KeyAttr::Pk, "CIRCLE#c1")
            .with(KeyAttr::Gsi4Pk, "TENANT#t1#CIRCLES");
        let value = serde_json::to_value(&keys).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["PK"], "CIRCLE#c1");
        assert_eq!(obj["GSI4PK"], "TENANT#t1#CIRCLES");
    }

    #[test]
    fn test_attr_names_round_trip() {
        for attr in KeyAttr::ALL {
            assert_eq!(KeyAttr::from_name(attr.name()), Some(attr));
        }
        assert_eq!(KeyAttr::from_name("pk"), None);
    }

    #[test]
    fn test_index_slots() {
        assert_eq!(Index::Gsi4.partition_attr(), KeyAttr::Gsi4Pk);
        assert_eq!(Index::Gsi2.sort_attr().name(), "GSI2SK");
    }
}
