//! Typed records and endpoint constants for the INE statistics API.
//!
//! This crate defines the read-only projections of upstream responses shared
//! by the control plane and the MCP surface, plus the tool-facing summary
//! records built from them.

pub mod models;
pub mod period;
pub mod schema;

pub use models::*;
pub use period::{PeriodType, PeriodTypeError};
