//! Expression builder for madmall-db
//!
//! Compiles key, filter, projection and paging directives into
//! parameterized expression strings.
//!
//! # Design Principles
//!
//! - Attribute names are always aliased through `#attrN` placeholders and
//!   literals through `:valN`, so reserved words and caller input never
//!   appear in an expression string
//! - Names and values maps are present iff referenced
//! - Contract violations are rejected at build, never at the store

mod ast;
mod builder;
mod errors;
mod params;
mod presets;
mod update;

pub use ast::{Condition, ConditionKind, Operand, Operator};
pub use builder::{QueryBuilder, SortDirection};
pub use errors::{QueryError, QueryErrorCode, QueryResult};
pub use params::QueryParams;
pub use presets::QueryPresets;
pub use update::{UpdateParams, VersionedUpdate, PROTECTED_ATTRIBUTES};
