//! MCP tool modules.
//!
//! Tools are grouped by domain: catalog lookup, series data access, search
//! and latest-value summaries, and contextual help.

pub mod catalog;
pub mod data;
pub mod search;
pub(crate) mod context;
