//! Common query shapes over the single table

use serde_json::Value;

use super::ast::{Operand, Operator};
use super::builder::QueryBuilder;
use crate::keys::{Index, KeyAttr, KeyPrefix};

pub struct QueryPresets;

impl QueryPresets {
    pub fn by_partition_key(pk: &str, value: impl Into<Value>) -> QueryBuilder {
        QueryBuilder::new().partition_key(pk, value)
    }

    pub fn by_keys(
        pk: &str,
        pk_value: impl Into<Value>,
        sk: &str,
        sk_value: impl Into<Value>,
    ) -> QueryBuilder {
        QueryBuilder::new()
            .partition_key(pk, pk_value)
            .sort_key(sk, Operator::Eq, Operand::value(sk_value))
    }

    pub fn begins_with(
        pk: &str,
        pk_value: impl Into<Value>,
        sk: &str,
        sk_prefix: &str,
    ) -> QueryBuilder {
        QueryBuilder::new()
            .partition_key(pk, pk_value)
            .begins_with(sk, sk_prefix)
    }

    pub fn gsi_by_partition_key(index: &str, pk: &str, value: impl Into<Value>) -> QueryBuilder {
        QueryBuilder::new().use_index(index).partition_key(pk, value)
    }

    pub fn gsi_by_keys(
        index: &str,
        pk: &str,
        pk_value: impl Into<Value>,
        sk: &str,
        sk_value: impl Into<Value>,
    ) -> QueryBuilder {
        QueryBuilder::new()
            .use_index(index)
            .partition_key(pk, pk_value)
            .sort_key(sk, Operator::Eq, Operand::value(sk_value))
    }

    /// Range read for a registry prefix pattern such as
    /// [`crate::keys::KeyPatterns::user_circles`]
    pub fn prefix(prefix: &KeyPrefix) -> QueryBuilder {
        let (pk_attr, pk_value) = &prefix.partition;
        let (sk_attr, sk_prefix) = &prefix.sort_prefix;
        let builder = match index_of(*pk_attr) {
            Some(index) => QueryBuilder::new().on_index(index),
            None => QueryBuilder::new(),
        };
        builder
            .partition_key(pk_attr.name(), pk_value.as_str())
            .begins_with(sk_attr.name(), sk_prefix.as_str())
    }

    /// Tenant-scoped listing on GSI4, newest first
    pub fn tenant_listing(gsi4pk: &str) -> QueryBuilder {
        QueryBuilder::new()
            .on_index(Index::Gsi4)
            .partition_key(KeyAttr::Gsi4Pk.name(), gsi4pk)
            .sort_desc(None)
    }
}

fn index_of(attr: KeyAttr) -> Option<Index> {
    [Index::Gsi1, Index::Gsi2, Index::Gsi3, Index::Gsi4]
        .into_iter()
        .find(|index| index.partition_attr() == attr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyPatterns;
    use serde_json::json;

    #[test]
    fn test_by_keys() {
        let params = QueryPresets::by_keys("PK", "USER#u1", "SK", "PROFILE")
            .build()
            .unwrap();
        assert_eq!(
            params.key_condition_expression.as_deref(),
            Some("#attr0 = :val0 AND #attr1 = :val1")
        );
        assert!(params.index_name.is_none());
    }

    #[test]
    fn test_gsi_presets_set_index() {
        let params = QueryPresets::gsi_by_partition_key("GSI1", "GSI1PK", "EMAIL#a@b.com")
            .build()
            .unwrap();
        assert_eq!(params.index_name.as_deref(), Some("GSI1"));

        let params = QueryPresets::gsi_by_keys("GSI3", "GSI3PK", "CIRCLE_STATUS#active", "GSI3SK", "x")
            .build()
            .unwrap();
        assert_eq!(params.index_name.as_deref(), Some("GSI3"));
        assert_eq!(params.expression_attribute_values.unwrap().len(), 2);
    }

    #[test]
    fn test_prefix_from_registry() {
        let params = QueryPresets::prefix(&KeyPatterns::user_circles("u1"))
            .build()
            .unwrap();
        let values = params.expression_attribute_values.unwrap();
        assert_eq!(values[":val0"], json!("USER#u1"));
        assert_eq!(values[":val1"], json!("CIRCLE#"));
        assert!(params.index_name.is_none());
    }

    #[test]
    fn test_tenant_listing() {
        let params = QueryPresets::tenant_listing("TENANT#acme#USERS").build().unwrap();
        assert_eq!(params.index_name.as_deref(), Some("GSI4"));
        assert_eq!(params.scan_index_forward, Some(false));
    }

    #[test]
    fn test_begins_with_preset() {
        let params = QueryPresets::begins_with("PK", "CIRCLE#c1", "SK", "MEMBER#")
            .build()
            .unwrap();
        assert_eq!(
            params.key_condition_expression.as_deref(),
            Some("#attr0 = :val0 AND begins_with(#attr1, :val1)")
        );
    }
}
