//! Core services for ine-mcp.
//!
//! This crate owns the upstream seam to the INE JSON API, the response
//! normaliser that separates "not found" from real failures, the text folding
//! used by local searches, and the control plane implementing every tool
//! operation.

pub mod control;
pub mod error;
pub mod params;
pub mod text;
pub mod upstream;

pub use control::{ControlOptions, IneControlPlane};
pub use error::{IneError, IneResult};
pub use params::{DataQuery, DateRange};
pub use upstream::{HttpUpstream, Upstream};
