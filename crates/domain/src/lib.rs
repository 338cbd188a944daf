//! # piiguard Domain
//!
//! Data types shared by the detection and policy engines.
//!
//! This crate contains:
//! - PII categories, risk and confidence bands, operations
//! - Detection spans and results
//! - Policy rules, evaluation context and decisions
//!
//! ## Architecture
//! - No dependencies on other piiguard crates
//! - Values only: nothing here holds a reference back to an engine

pub mod macros;
pub mod types;

// Re-export commonly used items
pub use types::*;
