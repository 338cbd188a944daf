use std::fmt;

use serde::{Deserialize, Serialize};

use super::category::PiiCategory;
use super::levels::{ConfidenceLevel, RiskLevel};

/// Which detector produced a span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionSource {
    Pattern,
    EntityRecognizer,
}

/// Entity kinds an external recognizer can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Person,
    Organization,
}

impl EntityKind {
    pub fn category(self) -> PiiCategory {
        match self {
            Self::Person => PiiCategory::PersonName,
            Self::Organization => PiiCategory::Organization,
        }
    }
}

/// Recognizer-reported certainty. Only `Strong` lets an entity span exceed Medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityStrength {
    #[default]
    Normal,
    Strong,
}

/// Supplementary facts recorded about how a span was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanMetadata {
    pub source: DetectionSource,
    /// A structural validator accepted the match
    #[serde(default)]
    pub validated: bool,
    /// Label keyword found shortly before the span
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Surrounding text, present only when context was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl SpanMetadata {
    pub fn new(source: DetectionSource) -> Self {
        Self { source, validated: false, label: None, context: None }
    }
}

/// One detected occurrence of a category within the input
///
/// `start..end` are byte offsets into the original input and always fall on
/// char boundaries. `text` equals `input[start..end]`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSpan {
    pub category: PiiCategory,
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub confidence: ConfidenceLevel,
    pub risk_level: RiskLevel,
    pub metadata: SpanMetadata,
}

impl DetectionSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when the half-open ranges intersect
    pub fn overlaps(&self, other: &DetectionSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

// Matched text stays out of Debug output so spans can be traced safely.
impl fmt::Debug for DetectionSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectionSpan")
            .field("category", &self.category)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("text", &format_args!("<redacted {} bytes>", self.text.len()))
            .field("confidence", &self.confidence)
            .field("risk_level", &self.risk_level)
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// Aggregate outcome of a single detection call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub has_pii: bool,
    /// Distinct categories in order of first appearance
    pub categories: Vec<PiiCategory>,
    /// Non-overlapping spans ordered by start offset
    pub spans: Vec<DetectionSpan>,
    /// Highest band among the spans; `None` when nothing was found
    pub overall_confidence: Option<ConfidenceLevel>,
    pub suggestions: Vec<String>,
}

impl DetectionResult {
    /// Result for text with no surviving spans
    pub fn empty() -> Self {
        Self {
            has_pii: false,
            categories: Vec::new(),
            spans: Vec::new(),
            overall_confidence: None,
            suggestions: Vec::new(),
        }
    }

    pub fn spans_of<'a>(
        &'a self,
        category: &'a PiiCategory,
    ) -> impl Iterator<Item = &'a DetectionSpan> + 'a {
        self.spans.iter().filter(move |span| &span.category == category)
    }

    /// Highest risk among the spans
    pub fn max_risk(&self) -> Option<RiskLevel> {
        self.spans.iter().map(|span| span.risk_level).max()
    }
}
