//! PII detection: pattern registry, span matching, resolution and scoring
//!
//! ```text
//! text ──► SpanMatcher ──► resolver::resolve ──► DetectionResult
//!          ├─ PatternDetector (registry snapshot)
//!          └─ EntityDetector  (optional EntityRecognizer)
//! ```

pub mod defaults;
pub mod engine;
pub mod matcher;
pub mod recognizer;
pub mod registry;
pub mod resolver;
pub mod rule;

pub use engine::{DetectionEngine, CRITICAL_SUGGESTION, HIGH_RISK_SUGGESTION};
pub use matcher::{Candidate, Detector, EntityDetector, PatternDetector, SpanMatcher};
pub use recognizer::{EntityRecognizer, RecognizedEntity};
pub use registry::{PatternRegistry, RegistrySnapshot, SelfTestFailure};
pub use rule::{
    PatternDefinition, PatternRule, PatternRuleBuilder, Validator, ValidatorKind, Verdict,
};
