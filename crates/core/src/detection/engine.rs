use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use piiguard_domain::{DetectionResult, DetectionSpan, PiiCategory, RiskLevel};
use tracing::{debug, instrument};

use super::matcher::SpanMatcher;
use super::recognizer::EntityRecognizer;
use super::registry::PatternRegistry;
use super::resolver;
use crate::config::DetectionOptions;
use crate::error::{PiiError, PiiResult};

pub const CRITICAL_SUGGESTION: &str =
    "Critical PII detected: do not log or store this text in plaintext";
pub const HIGH_RISK_SUGGESTION: &str = "High-risk PII detected: mask before display";

fn suggestion_for(risk: RiskLevel) -> Option<&'static str> {
    match risk {
        RiskLevel::Critical => Some(CRITICAL_SUGGESTION),
        RiskLevel::High => Some(HIGH_RISK_SUGGESTION),
        RiskLevel::Moderate | RiskLevel::Low => None,
    }
}

/// Public entry point for PII detection
///
/// Holds a shared [`PatternRegistry`] and an optional recognizer. Each call
/// scans a snapshot of the registry taken at the start of the call.
#[derive(Clone)]
pub struct DetectionEngine {
    registry: Arc<PatternRegistry>,
    recognizer: Option<Arc<dyn EntityRecognizer>>,
}

impl fmt::Debug for DetectionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectionEngine")
            .field("registry", &self.registry)
            .field("recognizer", &self.recognizer.is_some())
            .finish()
    }
}

impl DetectionEngine {
    pub fn new(registry: Arc<PatternRegistry>) -> Self {
        Self { registry, recognizer: None }
    }

    /// Engine over a fresh registry holding the built-in patterns
    pub fn with_defaults() -> PiiResult<Self> {
        Ok(Self::new(Arc::new(PatternRegistry::with_defaults()?)))
    }

    #[must_use]
    pub fn with_recognizer(mut self, recognizer: Arc<dyn EntityRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn registry(&self) -> &Arc<PatternRegistry> {
        &self.registry
    }

    /// Scans `text` and returns non-overlapping, scored spans
    ///
    /// The text is scanned exactly as given. Offsets in the result are byte
    /// offsets into `text`.
    ///
    /// # Errors
    /// - [`PiiError::EmptyInput`] when `text` is empty
    /// - [`PiiError::InputTooLarge`] when `text` exceeds `max_text_length`
    /// - [`PiiError::Common`] when `options` fail validation
    #[instrument(skip(self, text, options), fields(len = text.len()))]
    pub fn detect(&self, text: &str, options: &DetectionOptions) -> PiiResult<DetectionResult> {
        options.validate()?;

        if text.is_empty() {
            return Err(PiiError::EmptyInput);
        }
        if text.len() > options.max_text_length {
            return Err(PiiError::InputTooLarge {
                len: text.len(),
                max: options.max_text_length,
            });
        }

        let start_time = Instant::now();
        let matcher = SpanMatcher::new(self.registry.snapshot(), self.recognizer.clone(), options);
        let candidates = matcher.scan(text, options);
        let candidate_count = candidates.len();
        let spans = resolver::resolve(text, candidates, options);
        let result = assemble(spans);

        debug!(
            candidates = candidate_count,
            spans = result.spans.len(),
            categories = ?result.categories,
            elapsed_us = start_time.elapsed().as_micros() as u64,
            "detection complete"
        );

        Ok(result)
    }

    /// Convenience check: true when any span survives with default options
    pub fn contains_pii(&self, text: &str) -> PiiResult<bool> {
        Ok(self.detect(text, &DetectionOptions::default())?.has_pii)
    }
}

fn assemble(spans: Vec<DetectionSpan>) -> DetectionResult {
    let mut categories: Vec<PiiCategory> = Vec::new();
    let mut suggestions: Vec<String> = Vec::new();

    for span in &spans {
        if !categories.contains(&span.category) {
            categories.push(span.category.clone());
        }
        if let Some(hint) = suggestion_for(span.risk_level) {
            if !suggestions.iter().any(|s| s == hint) {
                suggestions.push(hint.to_string());
            }
        }
    }

    DetectionResult {
        has_pii: !spans.is_empty(),
        overall_confidence: spans.iter().map(|span| span.confidence).max(),
        categories,
        spans,
        suggestions,
    }
}
