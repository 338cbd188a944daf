//! Pattern rules and their false-positive validators

use std::fmt;
use std::sync::Arc;

use piiguard_common::utils::preceding_window;
use piiguard_domain::{PiiCategory, RiskLevel};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{PiiError, PiiResult};

/// Outcome of running a validator over a raw match
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verdict {
    /// Drop the match silently
    Reject,
    /// Keep the match without raising confidence
    Accept,
    /// Keep the match; a structural check positively confirmed it
    Validated,
}

/// Signature for caller-supplied validators
pub type ValidatorFn = dyn Fn(&str) -> Verdict + Send + Sync;

/// Serializable validator selection used in pattern documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidatorKind {
    Luhn,
    SsnStructure,
    Ipv4Octets,
    Iban,
    RejectRepeatedDigits,
    RejectLiterals { values: Vec<String> },
}

/// False-positive filter attached to a [`PatternRule`]
///
/// Checksum and structure checks (`Luhn`, `SsnStructure`, `Iban`) return
/// [`Verdict::Validated`] on success. Filters only ever accept or reject.
#[derive(Clone)]
pub enum Validator {
    Luhn,
    SsnStructure,
    Ipv4Octets,
    Iban,
    RejectRepeatedDigits,
    RejectLiterals(Vec<String>),
    Custom { name: String, check: Arc<ValidatorFn> },
}

/// SSNs that appear in documentation and advertising and were never issued
const SSN_PLACEHOLDERS: &[&str] = &["123456789", "078051120", "219099999"];

impl Validator {
    pub fn custom<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str) -> Verdict + Send + Sync + 'static,
    {
        Self::Custom { name: name.into(), check: Arc::new(check) }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Luhn => "luhn",
            Self::SsnStructure => "ssn_structure",
            Self::Ipv4Octets => "ipv4_octets",
            Self::Iban => "iban",
            Self::RejectRepeatedDigits => "reject_repeated_digits",
            Self::RejectLiterals(_) => "reject_literals",
            Self::Custom { name, .. } => name,
        }
    }

    pub fn check(&self, candidate: &str) -> Verdict {
        match self {
            Self::Luhn => verdict(luhn_valid(candidate), Verdict::Validated),
            Self::SsnStructure => verdict(ssn_valid(candidate), Verdict::Validated),
            Self::Ipv4Octets => verdict(ipv4_valid(candidate), Verdict::Accept),
            Self::Iban => verdict(iban_valid(candidate), Verdict::Validated),
            Self::RejectRepeatedDigits => verdict(!repeated_digits(candidate), Verdict::Accept),
            Self::RejectLiterals(values) => verdict(
                !values.iter().any(|value| value.eq_ignore_ascii_case(candidate.trim())),
                Verdict::Accept,
            ),
            Self::Custom { check, .. } => check(candidate),
        }
    }
}

fn verdict(passed: bool, on_pass: Verdict) -> Verdict {
    if passed {
        on_pass
    } else {
        Verdict::Reject
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RejectLiterals(values) => {
                f.debug_tuple("RejectLiterals").field(&values.len()).finish()
            }
            other => f.write_str(other.name()),
        }
    }
}

impl From<ValidatorKind> for Validator {
    fn from(kind: ValidatorKind) -> Self {
        match kind {
            ValidatorKind::Luhn => Self::Luhn,
            ValidatorKind::SsnStructure => Self::SsnStructure,
            ValidatorKind::Ipv4Octets => Self::Ipv4Octets,
            ValidatorKind::Iban => Self::Iban,
            ValidatorKind::RejectRepeatedDigits => Self::RejectRepeatedDigits,
            ValidatorKind::RejectLiterals { values } => Self::RejectLiterals(values),
        }
    }
}

fn digits(value: &str) -> Vec<u32> {
    value.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn luhn_valid(number: &str) -> bool {
    let digits = digits(number);

    if digits.len() < 13 || digits.len() > 19 {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &digit)| {
            if i % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum();

    sum % 10 == 0
}

fn ssn_valid(ssn: &str) -> bool {
    let digits: String = ssn.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 9 || SSN_PLACEHOLDERS.contains(&digits.as_str()) {
        return false;
    }
    let (area, rest) = digits.split_at(3);
    let (group, serial) = rest.split_at(2);
    area != "000" && area != "666" && !area.starts_with('9') && group != "00" && serial != "0000"
}

fn ipv4_valid(ip: &str) -> bool {
    let parts: Vec<&str> = ip.split('.').collect();
    parts.len() == 4 && parts.iter().all(|part| part.parse::<u8>().is_ok())
}

fn iban_valid(iban: &str) -> bool {
    let compact: String = iban.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() < 15 || compact.len() > 34 || !compact.is_ascii() {
        return false;
    }
    let (head, tail) = compact.split_at(4);
    let mut remainder: u32 = 0;
    for c in tail.chars().chain(head.chars()) {
        let value = match c.to_digit(36) {
            Some(v) => v,
            None => return false,
        };
        remainder = if value < 10 {
            (remainder * 10 + value) % 97
        } else {
            (remainder * 100 + value) % 97
        };
    }
    remainder == 1
}

fn repeated_digits(value: &str) -> bool {
    let digits = digits(value);
    digits.len() > 1 && digits.iter().all(|d| *d == digits[0])
}

/// Serializable form of a pattern rule, compiled by [`PatternRule::from_definition`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDefinition {
    pub category: PiiCategory,
    pub pattern: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub validators: Vec<ValidatorKind>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

/// Compiled match rule for a single category
///
/// Rules are immutable once built. Building compiles the pattern and the
/// label vocabulary, so a rule that exists can always be scanned.
#[derive(Debug, Clone)]
pub struct PatternRule {
    category: PiiCategory,
    regex: Regex,
    description: String,
    risk_level: RiskLevel,
    validators: Vec<Validator>,
    labels: Vec<String>,
    label_regex: Option<Regex>,
    examples: Vec<String>,
}

impl PatternRule {
    pub fn builder(category: PiiCategory, pattern: impl Into<String>) -> PatternRuleBuilder {
        PatternRuleBuilder {
            category,
            pattern: pattern.into(),
            description: String::new(),
            risk_level: RiskLevel::default(),
            validators: Vec::new(),
            labels: Vec::new(),
            examples: Vec::new(),
        }
    }

    pub fn from_definition(definition: PatternDefinition) -> PiiResult<Self> {
        Self::builder(definition.category, definition.pattern)
            .description(definition.description)
            .risk_level(definition.risk_level)
            .validators(definition.validators.into_iter().map(Validator::from))
            .labels(definition.labels)
            .examples(definition.examples)
            .build()
    }

    pub fn category(&self) -> &PiiCategory {
        &self.category
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn examples(&self) -> &[String] {
        &self.examples
    }

    pub(crate) fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Combined verdict of every validator. Any rejection wins.
    pub fn validate(&self, candidate: &str) -> Verdict {
        let mut outcome = Verdict::Accept;
        for validator in &self.validators {
            match validator.check(candidate) {
                Verdict::Reject => return Verdict::Reject,
                Verdict::Validated => outcome = Verdict::Validated,
                Verdict::Accept => {}
            }
        }
        outcome
    }

    /// Label keyword found within `lookback` characters before `start`
    pub fn find_label<'t>(&self, text: &'t str, start: usize, lookback: usize) -> Option<&'t str> {
        let regex = self.label_regex.as_ref()?;
        let window = preceding_window(text, start, lookback);
        regex.find_iter(window).last().map(|m| m.as_str())
    }

    /// Examples that the rule fails to match in full, or that a validator rejects
    pub fn failing_examples(&self) -> Vec<&str> {
        self.examples
            .iter()
            .filter(|example| {
                let full_match = self
                    .regex
                    .find(example)
                    .is_some_and(|m| m.start() == 0 && m.end() == example.len());
                !full_match || self.validate(example) == Verdict::Reject
            })
            .map(String::as_str)
            .collect()
    }
}

pub struct PatternRuleBuilder {
    category: PiiCategory,
    pattern: String,
    description: String,
    risk_level: RiskLevel,
    validators: Vec<Validator>,
    labels: Vec<String>,
    examples: Vec<String>,
}

impl PatternRuleBuilder {
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn risk_level(mut self, risk_level: RiskLevel) -> Self {
        self.risk_level = risk_level;
        self
    }

    #[must_use]
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    #[must_use]
    pub fn validators(mut self, validators: impl IntoIterator<Item = Validator>) -> Self {
        self.validators.extend(validators);
        self
    }

    #[must_use]
    pub fn labels<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.labels.extend(labels.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn examples<S: Into<String>>(mut self, examples: impl IntoIterator<Item = S>) -> Self {
        self.examples.extend(examples.into_iter().map(Into::into));
        self
    }

    /// Compiles the pattern and label vocabulary
    pub fn build(self) -> PiiResult<PatternRule> {
        let regex =
            Regex::new(&self.pattern).map_err(|e| PiiError::compilation(&self.category, &e))?;

        let labels: Vec<String> = self
            .labels
            .into_iter()
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty())
            .collect();

        let label_regex = if labels.is_empty() {
            None
        } else {
            let alternation =
                labels.iter().map(|label| regex::escape(label)).collect::<Vec<_>>().join("|");
            let compiled = Regex::new(&format!(r"(?i)\b(?:{alternation})\b"))
                .map_err(|e| PiiError::compilation(&self.category, &e))?;
            Some(compiled)
        };

        Ok(PatternRule {
            category: self.category,
            regex,
            description: self.description,
            risk_level: self.risk_level,
            validators: self.validators,
            labels,
            label_regex,
            examples: self.examples,
        })
    }
}
