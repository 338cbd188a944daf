//! # piiguard Core
//!
//! PII detection and policy decisions over free-form text.
//!
//! This crate contains:
//! - The detection engine: pattern registry, span matching, overlap
//!   resolution and confidence scoring
//! - The policy engine: rule tables, built-in regulatory profiles and
//!   operation-gated evaluation
//! - Versioned TOML/JSON documents for patterns and rule tables
//!
//! ## Architecture Principles
//! - Only depends on `piiguard-common` and `piiguard-domain`
//! - No storage, network or encryption; callers act on the decisions
//! - Natural-language entity recognition plugs in through
//!   [`EntityRecognizer`]
//! - Registries and tables are explicit values, never process-wide state
//!
//! ## Example
//! ```
//! use piiguard_core::{policy, DetectionEngine, DetectionOptions, PolicyEngine};
//! use piiguard_domain::{EvaluationContext, Operation};
//!
//! let engine = DetectionEngine::with_defaults().unwrap();
//! let result = engine
//!     .detect("Reach me at jane@example.com", &DetectionOptions::default())
//!     .unwrap();
//! assert!(result.has_pii);
//!
//! let policy = PolicyEngine::new(policy::strict());
//! let decisions = policy.evaluate_result(&result, Operation::Log, &EvaluationContext::default());
//! assert!(!decisions[0].allowed);
//! ```

pub mod config;
pub mod detection;
pub mod error;
pub mod policy;

pub use config::{DetectionOptions, PatternDocument, PolicyDocument, RuleDefinition};
pub use detection::{
    DetectionEngine, EntityRecognizer, PatternDefinition, PatternRegistry, PatternRule,
    RecognizedEntity, Validator, ValidatorKind,
};
pub use error::{PiiError, PiiResult};
pub use policy::{BuiltinProfile, ComplianceReport, PolicyEngine, RuleTable};
