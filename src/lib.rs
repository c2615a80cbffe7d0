//! madmall-db - single-table persistence core of the MADMall platform
//!
//! - `keys`: key pattern registry for the table and its four indexes
//! - `entity`: stored record envelope and entity schemas
//! - `query`: expression builder for queries and updates
//! - `validation`: record validators and configurable field rules
//! - `migration`: legacy import pipeline
//! - `observability`: structured events, counters and scopes
//! - `cli`: operator entry point

pub mod cli;
pub mod document;
pub mod entity;
pub mod keys;
pub mod migration;
pub mod observability;
pub mod query;
pub mod validation;
