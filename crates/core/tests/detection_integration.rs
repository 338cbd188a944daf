//! Integration tests for the detection engine
//!
//! Exercises the built-in pattern set end to end, the structural guarantees
//! every result carries, and entity recognizer integration.

mod support;

use std::sync::Arc;

use piiguard_core::detection::{CRITICAL_SUGGESTION, HIGH_RISK_SUGGESTION};
use piiguard_core::{
    DetectionEngine, DetectionOptions, PatternRegistry, PatternRule, PiiError, RecognizedEntity,
};
use piiguard_domain::{
    ConfidenceLevel, DetectionResult, DetectionSource, EntityKind, PiiCategory, RiskLevel,
};
use support::recognizer::ScriptedRecognizer;
use support::{init_tracing, CORPUS};

const CONTACT: &str = "Contact John Doe at john.doe@example.com or call (555) 123-4567";

fn engine() -> DetectionEngine {
    init_tracing();
    DetectionEngine::with_defaults().expect("built-in patterns compile")
}

fn detect(engine: &DetectionEngine, text: &str) -> DetectionResult {
    engine.detect(text, &DetectionOptions::default()).expect("detection succeeds")
}

/// Validates detection of contact details in free text.
///
/// Assertions:
/// - Email and phone are reported, in text order.
/// - Exactly one email span covering the full address.
/// - Offsets point back at the reported text.
#[test]
fn contact_text_reports_email_and_phone() {
    let engine = engine();
    let result = detect(&engine, CONTACT);

    assert!(result.has_pii);
    assert_eq!(result.categories, vec![PiiCategory::Email, PiiCategory::Phone]);

    let emails: Vec<_> = result.spans_of(&PiiCategory::Email).collect();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].text, "john.doe@example.com");
    assert_eq!(emails[0].start, CONTACT.find("john.doe").unwrap());

    let phone = result.spans_of(&PiiCategory::Phone).next().unwrap();
    assert_eq!(phone.text, "(555) 123-4567");
    assert_eq!(phone.end, CONTACT.len());
    assert_eq!(phone.metadata.label.as_deref(), Some("call"));
    assert_eq!(phone.confidence, ConfidenceLevel::High);
}

#[test]
fn ssn_is_critical_and_confident() {
    let engine = engine();
    let result = detect(&engine, "My SSN is 555-55-5555");

    assert_eq!(result.spans.len(), 1);
    let span = &result.spans[0];
    assert_eq!(span.category, PiiCategory::GovernmentId);
    assert_eq!(span.text, "555-55-5555");
    assert_eq!(span.risk_level, RiskLevel::Critical);
    assert!(span.confidence >= ConfidenceLevel::Medium);
    assert!(span.metadata.validated);
    assert_eq!(result.suggestions, vec![CRITICAL_SUGGESTION.to_string()]);
}

#[test]
fn placeholder_ssn_is_not_reported() {
    let engine = engine();
    let result = detect(&engine, "Example SSN: 123-45-6789");
    assert_eq!(result.spans_of(&PiiCategory::GovernmentId).count(), 0);
}

#[test]
fn comma_joined_emails_yield_two_spans() {
    let engine = engine();
    let text = "alice@example.com,bob@example.org";
    let result = detect(&engine, text);

    assert_eq!(result.spans.len(), 2);
    assert!(result.spans.iter().all(|s| s.category == PiiCategory::Email));
    assert_eq!(result.spans[0].text, "alice@example.com");
    assert_eq!(result.spans[1].text, "bob@example.org");
    assert!(result.spans[0].end <= result.spans[1].start);
    assert_eq!(result.categories, vec![PiiCategory::Email]);
}

#[test]
fn oversized_input_is_rejected_without_a_result() {
    let engine = engine();
    let options = DetectionOptions { max_text_length: 16, ..Default::default() };
    let text = "reach me at someone@example.com";

    match engine.detect(text, &options) {
        Err(PiiError::InputTooLarge { len, max }) => {
            assert_eq!(len, text.len());
            assert_eq!(max, 16);
        }
        other => panic!("expected InputTooLarge, got {other:?}"),
    }
}

#[test]
fn empty_input_is_an_error_but_whitespace_is_scanned() {
    let engine = engine();
    assert!(matches!(
        engine.detect("", &DetectionOptions::default()),
        Err(PiiError::EmptyInput)
    ));
    let result = detect(&engine, "   ");
    assert!(!result.has_pii);
    assert_eq!(result.overall_confidence, None);
}

#[test]
fn luhn_failures_are_dropped() {
    let engine = engine();
    let valid = detect(&engine, "card 4111 1111 1111 1111");
    let card = valid.spans_of(&PiiCategory::PaymentCard).next().unwrap();
    assert_eq!(card.text, "4111 1111 1111 1111");
    assert_eq!(card.confidence, ConfidenceLevel::VeryHigh);

    let invalid = detect(&engine, "card 4111 1111 1111 1112");
    assert_eq!(invalid.spans_of(&PiiCategory::PaymentCard).count(), 0);
}

/// Validates that a trailing token does not hide a valid card or IBAN.
///
/// Assertions:
/// - A CVV after the card number is left out of the card span.
/// - A currency code after the IBAN is left out of the account span.
/// - Both spans keep Critical risk.
#[test]
fn trailing_tokens_do_not_hide_financial_numbers() {
    let engine = engine();

    let result = detect(&engine, "Card: 4111 1111 1111 1111 123");
    let cards: Vec<_> = result.spans_of(&PiiCategory::PaymentCard).collect();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].text, "4111 1111 1111 1111");
    assert_eq!(cards[0].risk_level, RiskLevel::Critical);

    let result = detect(&engine, "IBAN BE68 5390 0754 7034 EUR");
    let accounts: Vec<_> = result.spans_of(&PiiCategory::BankAccount).collect();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].text, "BE68 5390 0754 7034");
    assert_eq!(accounts[0].risk_level, RiskLevel::Critical);
    assert!(accounts[0].metadata.validated);
}

#[test]
fn multibyte_text_keeps_byte_offsets() {
    let engine = engine();
    let text = "José Núñez <josé@correo.es>";
    let options = DetectionOptions::default().with_context(4);
    let result = engine.detect(text, &options).unwrap();

    let email = result.spans_of(&PiiCategory::Email).next().unwrap();
    assert_eq!(email.text, "josé@correo.es");
    assert_eq!(&text[email.start..email.end], email.text);
    let context = email.metadata.context.as_deref().unwrap();
    assert!(context.contains("josé@correo.es"));
}

/// Validates structural guarantees across the mixed corpus.
///
/// Assertions:
/// - Spans are sorted and never overlap.
/// - Every span's text equals the input slice at its offsets.
/// - `has_pii` and the category list agree with the spans.
#[test]
fn results_are_ordered_disjoint_and_faithful() {
    let engine = engine();
    for text in CORPUS {
        let result = detect(&engine, text);

        for pair in result.spans.windows(2) {
            assert!(pair[0].end <= pair[1].start, "overlap in {text:?}");
        }
        for span in &result.spans {
            assert!(span.start < span.end && span.end <= text.len());
            assert_eq!(&text[span.start..span.end], span.text);
            assert!(result.categories.contains(&span.category));
        }
        assert_eq!(result.has_pii, !result.spans.is_empty());
        assert_eq!(
            result.overall_confidence,
            result.spans.iter().map(|s| s.confidence).max()
        );
    }
}

#[test]
fn raising_the_threshold_only_removes_spans() {
    let engine = engine();
    let thresholds = [0.0, 0.3, 0.5, 0.7, 0.9, 1.0];

    for text in CORPUS {
        let results: Vec<DetectionResult> = thresholds
            .iter()
            .map(|t| engine.detect(text, &DetectionOptions::default().with_threshold(*t)).unwrap())
            .collect();

        for pair in results.windows(2) {
            let (lower, higher) = (&pair[0], &pair[1]);
            assert!(higher.spans.len() <= lower.spans.len());
            assert!(higher.spans.iter().all(|span| lower.spans.contains(span)), "{text:?}");
        }
        assert!(results.last().unwrap().spans.is_empty());
    }
}

#[test]
fn detection_is_deterministic() {
    let engine = engine();
    let options = DetectionOptions::default().with_context(8);
    for text in CORPUS {
        let first = engine.detect(text, &options).unwrap();
        let second = engine.detect(text, &options).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn category_filter_limits_scanning() {
    let engine = engine();
    let options = DetectionOptions::default().only_categories([PiiCategory::Phone]);
    let result = engine.detect(CONTACT, &options).unwrap();
    assert_eq!(result.categories, vec![PiiCategory::Phone]);
}

/// Validates entity recognizer integration.
///
/// Assertions:
/// - Recognized people become person_name spans tagged with the recognizer source.
/// - Normal-strength entities are capped at Medium; strong ones are not.
/// - High-risk entities add the masking suggestion.
#[test]
fn recognizer_entities_become_spans() {
    init_tracing();
    let weak = Arc::new(ScriptedRecognizer::default().with_entity(
        CONTACT,
        "John Doe",
        EntityKind::Person,
    ));
    let engine = DetectionEngine::with_defaults().unwrap().with_recognizer(weak.clone());
    let result = detect(&engine, CONTACT);

    assert_eq!(weak.calls(), 1);
    assert_eq!(
        result.categories,
        vec![PiiCategory::PersonName, PiiCategory::Email, PiiCategory::Phone]
    );
    let person = &result.spans[0];
    assert_eq!(person.text, "John Doe");
    assert_eq!(person.metadata.source, DetectionSource::EntityRecognizer);
    assert_eq!(person.confidence, ConfidenceLevel::Medium);
    assert!(result.suggestions.contains(&HIGH_RISK_SUGGESTION.to_string()));

    let strong = Arc::new(ScriptedRecognizer::default().with_strong_entity(
        CONTACT,
        "John Doe",
        EntityKind::Person,
    ));
    let engine = DetectionEngine::with_defaults().unwrap().with_recognizer(strong);
    let person = detect(&engine, CONTACT).spans.remove(0);
    assert_eq!(person.confidence, ConfidenceLevel::High);
}

#[test]
fn recognizer_can_be_disabled_per_call() {
    let recognizer = Arc::new(ScriptedRecognizer::default().with_entity(
        CONTACT,
        "John Doe",
        EntityKind::Person,
    ));
    let engine = DetectionEngine::with_defaults().unwrap().with_recognizer(recognizer.clone());
    let options = DetectionOptions { enable_entity_recognition: false, ..Default::default() };

    let result = engine.detect(CONTACT, &options).unwrap();
    assert_eq!(recognizer.calls(), 0);
    assert!(!result.categories.contains(&PiiCategory::PersonName));
}

#[test]
fn unfaithful_recognizer_output_is_discarded() {
    init_tracing();
    let recognizer = Arc::new(
        ScriptedRecognizer::default()
            .with_raw(RecognizedEntity::new(3, 11, "John Doe", EntityKind::Person))
            .with_raw(RecognizedEntity::new(0, 500, "Contact", EntityKind::Organization)),
    );
    let engine = DetectionEngine::with_defaults().unwrap().with_recognizer(recognizer);
    let result = detect(&engine, CONTACT);
    assert!(result.spans.iter().all(|s| s.metadata.source == DetectionSource::Pattern));
}

#[test]
fn pattern_wins_identical_range_over_recognizer() {
    let recognizer = Arc::new(ScriptedRecognizer::default().with_entity(
        CONTACT,
        "john.doe@example.com",
        EntityKind::Organization,
    ));
    let engine = DetectionEngine::with_defaults().unwrap().with_recognizer(recognizer);
    let result = detect(&engine, CONTACT);

    let span = result.spans.iter().find(|s| s.text == "john.doe@example.com").unwrap();
    assert_eq!(span.category, PiiCategory::Email);
    assert_eq!(span.metadata.source, DetectionSource::Pattern);
}

/// Validates runtime registry changes through a shared engine.
///
/// Assertions:
/// - Re-registering a category replaces its rule for later calls.
/// - Unregistering stops detection of that category.
#[test]
fn registry_changes_apply_to_later_calls() {
    let registry = Arc::new(PatternRegistry::with_defaults().unwrap());
    let engine = DetectionEngine::new(Arc::clone(&registry));
    let text = "ping 10.0.0.7 now";

    let before = detect(&engine, text);
    assert_eq!(before.spans[0].risk_level, RiskLevel::Moderate);

    let replacement = PatternRule::builder(PiiCategory::IpAddress, r"\b(?:\d{1,3}\.){3}\d{1,3}\b")
        .risk_level(RiskLevel::High)
        .build()
        .unwrap();
    let previous = registry.register(replacement);
    assert!(previous.is_some());
    let after = detect(&engine, text);
    assert_eq!(after.spans[0].risk_level, RiskLevel::High);
    assert_eq!(after.suggestions, vec![HIGH_RISK_SUGGESTION.to_string()]);

    registry.unregister(&PiiCategory::IpAddress);
    assert!(!detect(&engine, text).has_pii);
}

#[test]
fn custom_categories_are_detected() {
    let registry = PatternRegistry::new();
    registry.register(
        PatternRule::builder(PiiCategory::Custom("employee_id".into()), r"\bEMP-\d{6}\b")
            .risk_level(RiskLevel::High)
            .labels(["employee"])
            .build()
            .unwrap(),
    );
    let engine = DetectionEngine::new(Arc::new(registry));
    let result = detect(&engine, "employee EMP-004211 badge");

    let span = &result.spans[0];
    assert_eq!(span.category.to_string(), "custom_employee_id");
    assert_eq!(span.confidence, ConfidenceLevel::VeryHigh);
}

#[test]
fn engines_share_across_threads() {
    let engine = engine();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = engine.clone();
            std::thread::spawn(move || engine.detect(CONTACT, &DetectionOptions::default()))
        })
        .collect();

    let expected = detect(&engine, CONTACT);
    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), expected);
    }
}
