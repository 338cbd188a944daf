//! Overlap resolution and confidence scoring

use std::cmp::{Ordering, Reverse};

use piiguard_common::utils::context_window;
use piiguard_domain::{
    ConfidenceLevel, DetectionSource, DetectionSpan, EntityStrength, SpanMetadata,
};

use tracing::warn;

use super::matcher::Candidate;
use crate::config::DetectionOptions;

/// Precedence among candidates: earlier start, then longer span, then
/// pattern before recognizer, higher risk, earlier registration.
fn precedence(a: &Candidate, b: &Candidate) -> Ordering {
    a.start
        .cmp(&b.start)
        .then_with(|| Reverse(a.len()).cmp(&Reverse(b.len())))
        .then_with(|| a.source.cmp(&b.source))
        .then_with(|| Reverse(a.risk_level).cmp(&Reverse(b.risk_level)))
        .then_with(|| a.registration_index.cmp(&b.registration_index))
}

/// Confidence band for a candidate that survived overlap resolution
///
/// High and Critical risk start at High, everything else at Medium. A
/// validator confirmation and a nearby label each raise one band. Entity
/// spans stay at or below Medium unless the recognizer marked them Strong.
pub fn score(candidate: &Candidate) -> ConfidenceLevel {
    let mut confidence = ConfidenceLevel::baseline_for(candidate.risk_level);
    if candidate.validated {
        confidence = confidence.raised();
    }
    if candidate.label.is_some() {
        confidence = confidence.raised();
    }
    if candidate.source == DetectionSource::EntityRecognizer
        && candidate.strength != EntityStrength::Strong
    {
        confidence = confidence.min(ConfidenceLevel::Medium);
    }
    confidence
}

/// Keeps one candidate per character range, in start order
pub fn select_non_overlapping(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(precedence);

    let mut accepted: Vec<Candidate> = Vec::with_capacity(candidates.len());
    let mut last_end = 0usize;
    for candidate in candidates {
        if candidate.start < last_end {
            continue;
        }
        last_end = candidate.end;
        accepted.push(candidate);
    }
    accepted
}

/// Turns pooled candidates into scored, filtered, non-overlapping spans
///
/// Candidates that are empty or do not address a char-aligned range of
/// `text` are dropped before overlap resolution.
pub fn resolve(
    text: &str,
    candidates: Vec<Candidate>,
    options: &DetectionOptions,
) -> Vec<DetectionSpan> {
    let pooled = candidates.len();
    let candidates: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| c.start < c.end && text.get(c.start..c.end).is_some())
        .collect();
    if candidates.len() < pooled {
        warn!(discarded = pooled - candidates.len(), "discarded candidates outside the text");
    }

    select_non_overlapping(candidates)
        .into_iter()
        .filter_map(|candidate| {
            let matched = text.get(candidate.start..candidate.end)?;
            let confidence = score(&candidate);
            if let Some(threshold) = options.confidence_threshold {
                if !confidence.meets(threshold) {
                    return None;
                }
            }

            let context = options.include_context.then(|| {
                context_window(text, candidate.start, candidate.end, options.context_window)
                    .to_string()
            });

            Some(DetectionSpan {
                text: matched.to_string(),
                category: candidate.category,
                start: candidate.start,
                end: candidate.end,
                confidence,
                risk_level: candidate.risk_level,
                metadata: SpanMetadata {
                    source: candidate.source,
                    validated: candidate.validated,
                    label: candidate.label,
                    context,
                },
            })
        })
        .collect()
}
