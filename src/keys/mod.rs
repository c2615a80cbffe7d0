//! Key Pattern Registry for madmall-db
//!
//! Maps entity identities and access patterns to concrete key tuples so
//! every reader and writer agrees on the physical layout of the table.
//!
//! # Design Principles
//!
//! - Segments are delimited `TYPE#value` tokens, so unrelated entity
//!   families share one table without collision
//! - Ordering-sensitive patterns append a sortable `CREATED#<ts>` token
//! - Tenant-scoped listing goes through GSI4 (`TENANT#<id>#<FAMILY>`)
//! - Patterns are total, injective and deterministic

mod attributes;
mod patterns;
pub mod segment;

pub use attributes::{Index, KeyAttr, KeyAttributes};
pub use patterns::{KeyPatterns, KeyPrefix};
pub use segment::iso_timestamp;
