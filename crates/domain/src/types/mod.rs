//! Domain types for PII detection and policy decisions

pub mod category;
pub mod detection;
pub mod levels;
pub mod operation;
pub mod policy;

pub use category::PiiCategory;
pub use detection::{
    DetectionResult, DetectionSource, DetectionSpan, EntityKind, EntityStrength, SpanMetadata,
};
pub use levels::{ConfidenceLevel, RiskLevel};
pub use operation::Operation;
pub use policy::{DecisionMetadata, EvaluationContext, PolicyDecision, PolicyRule};
