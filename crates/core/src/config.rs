//! Detection options and static configuration documents
//!
//! Policy and pattern documents are versioned TOML or JSON files. Loading
//! compiles and validates everything up front so that detection and
//! evaluation never fail for configuration reasons.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use piiguard_common::error::{CommonError, CommonResult};
use piiguard_domain::{Operation, PiiCategory, PolicyRule, RiskLevel};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::detection::{PatternDefinition, PatternRegistry};
use crate::error::PiiResult;
use crate::policy::{category_risk, default_rule_category, BuiltinProfile, RuleTable};

/// Major version of the document format this build understands
pub const SUPPORTED_DOCUMENT_MAJOR: &str = "1";

pub const DEFAULT_CONTEXT_WINDOW: usize = 50;
pub const DEFAULT_LABEL_LOOKBACK: usize = 32;
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 1024 * 1024;

/// Per-call detection options
///
/// Window sizes count characters, so multibyte text never splits a char.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionOptions {
    /// Restricts scanning to these categories; `None` scans everything
    pub categories: Option<Vec<PiiCategory>>,
    pub enable_entity_recognition: bool,
    /// Minimum confidence weight in `0.0..=1.0`
    pub confidence_threshold: Option<f64>,
    pub include_context: bool,
    pub context_window: usize,
    /// How far before a span to look for a label such as `SSN:`
    pub label_lookback: usize,
    pub max_text_length: usize,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            categories: None,
            enable_entity_recognition: true,
            confidence_threshold: None,
            include_context: false,
            context_window: DEFAULT_CONTEXT_WINDOW,
            label_lookback: DEFAULT_LABEL_LOOKBACK,
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
        }
    }
}

impl DetectionOptions {
    /// Validate option values
    pub fn validate(&self) -> PiiResult<()> {
        if let Some(threshold) = self.confidence_threshold {
            if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
                return Err(CommonError::validation_with_value(
                    "confidence_threshold",
                    "must be between 0.0 and 1.0",
                    threshold.to_string(),
                )
                .into());
            }
        }

        if self.max_text_length == 0 {
            return Err(CommonError::config_field(
                "max_text_length",
                "Maximum text length cannot be zero",
            )
            .into());
        }

        Ok(())
    }

    pub fn is_category_active(&self, category: &PiiCategory) -> bool {
        self.categories.as_ref().map_or(true, |active| active.contains(category))
    }

    #[must_use]
    pub fn only_categories(mut self, categories: impl IntoIterator<Item = PiiCategory>) -> Self {
        self.categories = Some(categories.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = Some(threshold);
        self
    }

    /// Attaches `window` characters of surrounding text on each side of a span
    #[must_use]
    pub fn with_context(mut self, window: usize) -> Self {
        self.include_context = true;
        self.context_window = window;
        self
    }
}

/// Rule entry in a [`PolicyDocument`]
///
/// Omitted fields keep the value of the rule being overridden: the base
/// profile's rule for the category when the document names a base, otherwise
/// a neutral rule (category risk, no transforms, every operation allowed).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleDefinition {
    pub risk_level: Option<RiskLevel>,
    pub allow_logging: Option<bool>,
    pub require_masking: Option<bool>,
    pub require_encryption: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_days: Option<u32>,
    pub allowed_operations: Option<BTreeSet<Operation>>,
}

impl RuleDefinition {
    /// Layers the fields this definition names over `seed`
    fn apply(self, seed: PolicyRule) -> PiiResult<PolicyRule> {
        let field = format!("rules.{}", seed.category);
        let mut rule = PolicyRule {
            risk_level: self.risk_level.unwrap_or(seed.risk_level),
            require_masking: self.require_masking.unwrap_or(seed.require_masking),
            require_encryption: self.require_encryption.unwrap_or(seed.require_encryption),
            retention_days: self.retention_days.or(seed.retention_days),
            ..seed
        };

        if let Some(allowed) = self.allowed_operations {
            if let Some(allow_logging) = self.allow_logging {
                if allow_logging != allowed.contains(&Operation::Log) {
                    return Err(CommonError::config_field(
                        field,
                        "allow_logging contradicts allowed_operations",
                    )
                    .into());
                }
            }
            for operation in Operation::ALL {
                rule = if allowed.contains(&operation) {
                    rule.allow(operation)
                } else {
                    rule.deny(operation)
                };
            }
        } else if let Some(allow_logging) = self.allow_logging {
            rule = if allow_logging { rule.allow(Operation::Log) } else { rule.deny(Operation::Log) };
        }

        Ok(rule)
    }
}

fn neutral_rule(category: PiiCategory) -> PolicyRule {
    let risk = category_risk(&category);
    PolicyRule::new(category, risk)
}

/// Serialized rule table, optionally layered over a built-in profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    pub version: String,
    pub name: String,
    #[serde(default)]
    pub base: Option<BuiltinProfile>,
    #[serde(default)]
    pub transfer_requires_basis: Option<bool>,
    #[serde(default)]
    pub default_rule: Option<RuleDefinition>,
    #[serde(default)]
    pub rules: BTreeMap<PiiCategory, RuleDefinition>,
}

impl PolicyDocument {
    pub fn from_toml_str(content: &str) -> PiiResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> PiiResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Reads a document, picking the format from the file extension
    pub fn load<P: AsRef<Path>>(path: P) -> PiiResult<Self> {
        read_document(path.as_ref())
    }

    /// Loads a document and builds its table
    pub fn load_table<P: AsRef<Path>>(path: P) -> PiiResult<RuleTable> {
        Self::load(path)?.into_table()
    }

    /// Builds the rule table this document describes
    ///
    /// Categories without an entry inherit from the base profile, or from the
    /// default rule when there is no base. Entries for categories the base
    /// does not list start from the effective default rule.
    pub fn into_table(self) -> PiiResult<RuleTable> {
        check_version(&self.version)?;
        if self.name.trim().is_empty() {
            return Err(CommonError::config_field("name", "Policy name cannot be empty").into());
        }

        let base = self.base.map(BuiltinProfile::table);
        let default_rule = match self.default_rule {
            Some(definition) => Some(definition.apply(match &base {
                Some(table) => table.default_rule().clone(),
                None => neutral_rule(default_rule_category()),
            })?),
            None => None,
        };

        let mut rules = Vec::with_capacity(self.rules.len());
        for (category, definition) in self.rules {
            let seed = match &base {
                Some(table) => table
                    .get(&category)
                    .or(default_rule.as_ref())
                    .unwrap_or_else(|| table.default_rule())
                    .clone()
                    .for_category(category),
                None => neutral_rule(category),
            };
            rules.push(definition.apply(seed)?);
        }

        let mut builder = match (&base, default_rule) {
            (Some(table), default_rule) => {
                let builder = table.derive(self.name.as_str());
                match default_rule {
                    Some(rule) => builder.default_rule(rule),
                    None => builder,
                }
            }
            (None, Some(rule)) => RuleTable::builder(self.name.as_str(), rule),
            (None, None) => {
                return Err(CommonError::config_field(
                    "default_rule",
                    "A policy without a base profile must define a default rule",
                )
                .into());
            }
        };

        builder = builder.rules(rules);
        if let Some(required) = self.transfer_requires_basis {
            builder = builder.transfer_requires_basis(required);
        }

        let table = builder.build();
        info!(table = table.name(), base = ?self.base, rules = table.len(), "policy table loaded");
        Ok(table)
    }
}

/// Serialized pattern set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDocument {
    pub version: String,
    #[serde(default)]
    pub patterns: Vec<PatternDefinition>,
}

impl PatternDocument {
    pub fn from_toml_str(content: &str) -> PiiResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> PiiResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> PiiResult<Self> {
        read_document(path.as_ref())
    }

    /// Compiles every pattern into a fresh registry
    pub fn into_registry(self) -> PiiResult<PatternRegistry> {
        check_version(&self.version)?;
        let registry = PatternRegistry::from_definitions(self.patterns)?;
        info!(patterns = registry.len(), "pattern registry loaded");
        Ok(registry)
    }
}

fn check_version(version: &str) -> PiiResult<()> {
    let major = version.trim().split('.').next().unwrap_or_default();
    if major != SUPPORTED_DOCUMENT_MAJOR {
        return Err(CommonError::config_field(
            "version",
            format!("Unsupported document version '{version}', expected {SUPPORTED_DOCUMENT_MAJOR}.x"),
        )
        .into());
    }
    Ok(())
}

fn read_document<T: DeserializeOwned>(path: &Path) -> PiiResult<T> {
    parse_document(path).map_err(|err| {
        warn!(
            path = %path.display(),
            error_type = err.error_type_name(),
            "configuration document rejected"
        );
        err.into()
    })
}

fn parse_document<T: DeserializeOwned>(path: &Path) -> CommonResult<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CommonError::persistence_op("read_config", e.to_string()))?;

    let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("toml") => Ok(toml::from_str(&content)?),
        Some("json") => Ok(serde_json::from_str(&content)?),
        _ => Err(CommonError::config_field(
            "path",
            format!("Unsupported configuration format: {}", path.display()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PiiError;

    #[test]
    fn default_options_are_valid() {
        let options = DetectionOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.context_window, 50);
        assert_eq!(options.label_lookback, 32);
        assert_eq!(options.max_text_length, 1024 * 1024);
        assert!(options.enable_entity_recognition);
    }

    #[test]
    fn threshold_must_be_a_probability() {
        for bad in [-0.1, 1.01, f64::NAN, f64::INFINITY] {
            let options = DetectionOptions::default().with_threshold(bad);
            assert!(options.validate().is_err(), "{bad}");
        }
        assert!(DetectionOptions::default().with_threshold(1.0).validate().is_ok());
    }

    #[test]
    fn zero_max_length_is_rejected() {
        let options = DetectionOptions { max_text_length: 0, ..Default::default() };
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("max_text_length"));
    }

    #[test]
    fn category_filter() {
        let options = DetectionOptions::default().only_categories([PiiCategory::Email]);
        assert!(options.is_category_active(&PiiCategory::Email));
        assert!(!options.is_category_active(&PiiCategory::Phone));
        assert!(DetectionOptions::default().is_category_active(&PiiCategory::Phone));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: DetectionOptions =
            serde_json::from_str(r#"{"include_context": true, "categories": ["ssn"]}"#).unwrap();
        assert!(options.include_context);
        assert_eq!(options.context_window, DEFAULT_CONTEXT_WINDOW);
        assert_eq!(options.categories, Some(vec![PiiCategory::GovernmentId]));
    }

    /// Validates layering a document over a built-in profile.
    ///
    /// Assertions:
    /// - Listed categories are overridden.
    /// - Unlisted categories keep the base profile's rule.
    /// - The transfer gate can be overridden.
    #[test]
    fn document_overrides_base_profile() {
        let doc = PolicyDocument::from_toml_str(
            r#"
            version = "1.0"
            name = "acme"
            base = "gdpr"
            transfer_requires_basis = false

            [rules.email]
            risk_level = "low"
            allowed_operations = ["store", "process", "log"]
            "#,
        )
        .unwrap();
        let table = doc.into_table().unwrap();
        let gdpr = BuiltinProfile::EuGdpr.table();

        let email = table.rule(&PiiCategory::Email);
        assert_eq!(email.risk_level, RiskLevel::Low);
        assert!(!email.allows(Operation::Export));
        assert!(email.allow_logging);
        assert_eq!(table.rule(&PiiCategory::PaymentCard), gdpr.rule(&PiiCategory::PaymentCard));
        assert!(!table.transfer_requires_basis());
        assert_eq!(table.name(), "acme");
    }

    /// Validates that a partial override only changes the fields it names.
    ///
    /// Assertions:
    /// - Retention comes from the document.
    /// - Allowed operations and transforms stay as in the base profile.
    #[test]
    fn partial_override_keeps_base_restrictions() {
        let doc = PolicyDocument::from_toml_str(
            r#"
            version = "1"
            name = "strict-ip"
            base = "strict"

            [rules.ip_address]
            retention_days = 30
            "#,
        )
        .unwrap();
        let table = doc.into_table().unwrap();
        let strict = BuiltinProfile::Strict.table();

        let ip = table.rule(&PiiCategory::IpAddress);
        assert_eq!(ip.retention_days, Some(30));
        assert_eq!(ip.allowed_operations, strict.rule(&PiiCategory::IpAddress).allowed_operations);
        assert!(ip.require_masking);
        assert!(!ip.allows(Operation::Transfer));
        assert!(ip.is_consistent());
    }

    #[test]
    fn override_of_unlisted_category_starts_from_default_rule() {
        let doc = PolicyDocument::from_json_str(
            r#"{"version": "1", "name": "acme", "base": "strict",
                "default_rule": {"require_encryption": true},
                "rules": {"custom_badge": {"risk_level": "low"}}}"#,
        )
        .unwrap();
        let table = doc.into_table().unwrap();

        let badge = table.rule(&PiiCategory::Custom("badge".into()));
        assert_eq!(badge.category, PiiCategory::Custom("badge".into()));
        assert_eq!(badge.risk_level, RiskLevel::Low);
        assert!(badge.require_encryption);
        assert!(!badge.allows(Operation::Log));
    }

    #[test]
    fn document_without_base_needs_a_default_rule() {
        let doc = PolicyDocument::from_json_str(r#"{"version": "1", "name": "bare"}"#).unwrap();
        assert!(matches!(doc.into_table(), Err(PiiError::Common(CommonError::Config { .. }))));

        let doc = PolicyDocument::from_json_str(
            r#"{"version": "1", "name": "bare", "default_rule": {"allow_logging": false}}"#,
        )
        .unwrap();
        let table = doc.into_table().unwrap();
        assert!(!table.rule(&PiiCategory::Url).allows(Operation::Log));
        assert!(table.rule(&PiiCategory::Url).allows(Operation::Store));
    }

    #[test]
    fn contradictory_logging_flags_are_rejected() {
        let definition = RuleDefinition {
            allow_logging: Some(true),
            allowed_operations: Some([Operation::Store].into_iter().collect()),
            ..Default::default()
        };
        let err = definition.apply(neutral_rule(PiiCategory::Email)).unwrap_err();
        assert!(err.to_string().contains("rules.email"));
    }

    #[test]
    fn unsupported_major_version_is_rejected() {
        let doc = PolicyDocument::from_json_str(
            r#"{"version": "2.0", "name": "future", "base": "strict"}"#,
        )
        .unwrap();
        let err = doc.into_table().unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn pattern_document_compiles_into_registry() {
        let doc = PatternDocument::from_toml_str(
            r#"
            version = "1.2"

            [[patterns]]
            category = "employee_id"
            pattern = '\bEMP-\d{6}\b'
            risk_level = "high"
            labels = ["employee"]
            examples = ["EMP-123456"]
            "#,
        )
        .unwrap();
        let registry = doc.into_registry().unwrap();
        assert!(registry.contains(&PiiCategory::Custom("employee_id".into())));
        assert!(registry.self_test().is_empty());
    }

    #[test]
    fn bad_pattern_surfaces_compilation_error() {
        let doc = PatternDocument::from_json_str(
            r#"{"version": "1", "patterns": [{"category": "email", "pattern": "(unclosed"}]}"#,
        )
        .unwrap();
        assert!(matches!(doc.into_registry(), Err(PiiError::PatternCompilation { .. })));
    }
}
