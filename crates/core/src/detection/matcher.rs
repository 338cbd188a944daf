//! Candidate span collection from pattern rules and entity recognizers

use std::sync::Arc;

use piiguard_domain::{DetectionSource, EntityKind, EntityStrength, PiiCategory, RiskLevel};
use tracing::{trace, warn};

use super::recognizer::EntityRecognizer;
use super::registry::RegistrySnapshot;
use super::rule::{PatternRule, Verdict};
use crate::config::DetectionOptions;

/// Registration index given to spans that did not come from a pattern rule
pub const UNREGISTERED: usize = usize::MAX;

/// Raw finding before overlap resolution and scoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub category: PiiCategory,
    pub start: usize,
    pub end: usize,
    pub source: DetectionSource,
    pub risk_level: RiskLevel,
    /// Position of the owning rule in the registry
    pub registration_index: usize,
    pub validated: bool,
    pub label: Option<String>,
    pub strength: EntityStrength,
}

impl Candidate {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A source of candidate spans
pub trait Detector: Send + Sync {
    fn source(&self) -> DetectionSource;

    fn detect(&self, text: &str, options: &DetectionOptions) -> Vec<Candidate>;
}

/// Runs every active pattern rule over the text
#[derive(Debug, Clone)]
pub struct PatternDetector {
    rules: RegistrySnapshot,
}

impl PatternDetector {
    pub fn new(rules: RegistrySnapshot) -> Self {
        Self { rules }
    }
}

impl Detector for PatternDetector {
    fn source(&self) -> DetectionSource {
        DetectionSource::Pattern
    }

    fn detect(&self, text: &str, options: &DetectionOptions) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for (index, rule) in self.rules.iter().enumerate() {
            if !options.is_category_active(rule.category()) {
                continue;
            }

            let mut rejected = 0usize;
            for mat in rule.regex().find_iter(text) {
                if mat.start() == mat.end() {
                    continue;
                }

                let (end, verdict) = match rule.validate(mat.as_str()) {
                    Verdict::Reject => match accepted_prefix(rule, mat.as_str()) {
                        Some((prefix, verdict)) => (mat.start() + prefix.len(), verdict),
                        None => {
                            rejected += 1;
                            continue;
                        }
                    },
                    verdict => (mat.end(), verdict),
                };

                candidates.push(Candidate {
                    category: rule.category().clone(),
                    start: mat.start(),
                    end,
                    source: DetectionSource::Pattern,
                    risk_level: rule.risk_level(),
                    registration_index: index,
                    validated: verdict == Verdict::Validated,
                    label: rule
                        .find_label(text, mat.start(), options.label_lookback)
                        .map(str::to_string),
                    strength: EntityStrength::Normal,
                });
            }

            if rejected > 0 {
                trace!(category = %rule.category(), rejected, "validator rejected matches");
            }
        }

        candidates
    }
}

/// Longest prefix of a rejected match, cut at a space or hyphen, that the
/// rule still matches whole and its validators accept
///
/// Greedy patterns can swallow a trailing token (a CVV after a card number,
/// a currency code after an IBAN) and fail validation as a result.
fn accepted_prefix<'t>(rule: &PatternRule, matched: &'t str) -> Option<(&'t str, Verdict)> {
    let mut prefix = matched;
    while let Some(cut) = prefix.rfind([' ', '-']) {
        prefix = prefix[..cut].trim_end_matches([' ', '-']);
        let whole = rule
            .regex()
            .find(prefix)
            .is_some_and(|m| m.start() == 0 && m.end() == prefix.len());
        if !whole {
            continue;
        }
        match rule.validate(prefix) {
            Verdict::Reject => continue,
            verdict => return Some((prefix, verdict)),
        }
    }
    None
}

/// Adapts an [`EntityRecognizer`] to the [`Detector`] interface
#[derive(Clone)]
pub struct EntityDetector {
    recognizer: Arc<dyn EntityRecognizer>,
}

impl std::fmt::Debug for EntityDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityDetector").finish_non_exhaustive()
    }
}

impl EntityDetector {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self { recognizer }
    }

    fn risk_for(kind: EntityKind) -> RiskLevel {
        match kind {
            EntityKind::Person => RiskLevel::High,
            EntityKind::Organization => RiskLevel::Low,
        }
    }
}

impl Detector for EntityDetector {
    fn source(&self) -> DetectionSource {
        DetectionSource::EntityRecognizer
    }

    fn detect(&self, text: &str, options: &DetectionOptions) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        let mut discarded = 0usize;

        for entity in self.recognizer.recognize_entities(text) {
            if !entity.is_faithful_to(text) {
                discarded += 1;
                continue;
            }

            let category = entity.kind.category();
            if !options.is_category_active(&category) {
                continue;
            }

            candidates.push(Candidate {
                category,
                start: entity.start,
                end: entity.end,
                source: DetectionSource::EntityRecognizer,
                risk_level: Self::risk_for(entity.kind),
                registration_index: UNREGISTERED,
                validated: false,
                label: None,
                strength: entity.strength,
            });
        }

        if discarded > 0 {
            warn!(
                discarded,
                kept = candidates.len(),
                "discarded recognizer output with mismatched offsets"
            );
        }

        candidates
    }
}

/// Pools candidates from every attached detector
pub struct SpanMatcher {
    detectors: Vec<Box<dyn Detector>>,
}

impl std::fmt::Debug for SpanMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sources: Vec<DetectionSource> = self.detectors.iter().map(|d| d.source()).collect();
        f.debug_struct("SpanMatcher").field("sources", &sources).finish()
    }
}

impl SpanMatcher {
    /// Pattern detection over `rules`, plus entity recognition when a
    /// recognizer is attached and the options enable it
    pub fn new(
        rules: RegistrySnapshot,
        recognizer: Option<Arc<dyn EntityRecognizer>>,
        options: &DetectionOptions,
    ) -> Self {
        let mut detectors: Vec<Box<dyn Detector>> = vec![Box::new(PatternDetector::new(rules))];
        if options.enable_entity_recognition {
            if let Some(recognizer) = recognizer {
                detectors.push(Box::new(EntityDetector::new(recognizer)));
            }
        }
        Self { detectors }
    }

    /// Unsorted candidates from every detector
    pub fn scan(&self, text: &str, options: &DetectionOptions) -> Vec<Candidate> {
        self.detectors.iter().flat_map(|detector| detector.detect(text, options)).collect()
    }
}
