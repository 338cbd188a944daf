use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use piiguard_domain::PiiCategory;
use tracing::{info, instrument};

use super::defaults::default_definitions;
use super::rule::{PatternDefinition, PatternRule};
use crate::error::PiiResult;

/// Immutable view of the registered rules, in registration order
pub type RegistrySnapshot = Arc<Vec<PatternRule>>;

/// Example string a rule failed to match during [`PatternRegistry::self_test`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfTestFailure {
    pub category: PiiCategory,
    pub example: String,
}

/// Set of detectable categories and their match rules
///
/// Readers take a snapshot and scan it without holding the lock. Writers
/// build a new rule list and swap it in, so a scan in flight never observes
/// a half-applied change.
pub struct PatternRegistry {
    rules: RwLock<RegistrySnapshot>,
}

impl fmt::Debug for PatternRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternRegistry").field("rules", &self.len()).finish()
    }
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self { rules: RwLock::new(Arc::new(Vec::new())) }
    }

    /// Registry preloaded with the built-in pattern set
    pub fn with_defaults() -> PiiResult<Self> {
        Self::from_definitions(default_definitions().iter().cloned())
    }

    /// Compiles every definition before registering any of them
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = PatternDefinition>,
    ) -> PiiResult<Self> {
        let registry = Self::new();
        let rules = definitions
            .into_iter()
            .map(PatternRule::from_definition)
            .collect::<PiiResult<Vec<_>>>()?;
        for rule in rules {
            registry.register(rule);
        }
        Ok(registry)
    }

    /// Adds a rule, replacing any rule already registered for its category
    ///
    /// A replacement keeps the replaced rule's registration position. Returns
    /// the replaced rule.
    #[instrument(skip(self, rule), fields(category = %rule.category()))]
    pub fn register(&self, rule: PatternRule) -> Option<PatternRule> {
        let mut guard = self.rules.write();
        let mut next = guard.to_vec();

        let replaced = match next.iter().position(|r| r.category() == rule.category()) {
            Some(index) => Some(std::mem::replace(&mut next[index], rule)),
            None => {
                next.push(rule);
                None
            }
        };

        *guard = Arc::new(next);
        info!(replaced = replaced.is_some(), rules = guard.len(), "pattern rule registered");
        replaced
    }

    /// Compiles and registers a definition
    pub fn register_definition(
        &self,
        definition: PatternDefinition,
    ) -> PiiResult<Option<PatternRule>> {
        let rule = PatternRule::from_definition(definition)?;
        Ok(self.register(rule))
    }

    /// Removes the rule for `category`, returning it if present
    #[instrument(skip(self), fields(category = %category))]
    pub fn unregister(&self, category: &PiiCategory) -> Option<PatternRule> {
        let mut guard = self.rules.write();
        let index = guard.iter().position(|r| r.category() == category)?;

        let mut next = guard.to_vec();
        let removed = next.remove(index);
        *guard = Arc::new(next);
        info!(rules = guard.len(), "pattern rule unregistered");
        Some(removed)
    }

    /// Rules in registration order
    pub fn list(&self) -> Vec<PatternRule> {
        self.snapshot().to_vec()
    }

    pub fn get(&self, category: &PiiCategory) -> Option<PatternRule> {
        self.snapshot().iter().find(|r| r.category() == category).cloned()
    }

    pub fn contains(&self, category: &PiiCategory) -> bool {
        self.snapshot().iter().any(|r| r.category() == category)
    }

    pub fn categories(&self) -> Vec<PiiCategory> {
        self.snapshot().iter().map(|r| r.category().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current rule list. Later registry changes do not affect it.
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.rules.read().clone()
    }

    /// Runs every rule against its own example strings
    pub fn self_test(&self) -> Vec<SelfTestFailure> {
        self.snapshot()
            .iter()
            .flat_map(|rule| {
                rule.failing_examples().into_iter().map(move |example| SelfTestFailure {
                    category: rule.category().clone(),
                    example: example.to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use piiguard_domain::RiskLevel;

    use super::*;
    use crate::error::PiiError;

    fn rule(category: PiiCategory, pattern: &str) -> PatternRule {
        PatternRule::builder(category, pattern).build().unwrap()
    }

    #[test]
    fn list_preserves_registration_order() {
        let registry = PatternRegistry::new();
        registry.register(rule(PiiCategory::Phone, r"\d{3}-\d{4}"));
        registry.register(rule(PiiCategory::Email, r"\S+@\S+"));
        registry.register(rule(PiiCategory::Url, r"https?://\S+"));

        assert_eq!(
            registry.categories(),
            vec![PiiCategory::Phone, PiiCategory::Email, PiiCategory::Url]
        );
    }

    /// Validates `PatternRegistry::register` behavior for the duplicate
    /// category scenario.
    ///
    /// Assertions:
    /// - The replaced rule is returned.
    /// - The new rule keeps the original registration position.
    #[test]
    fn duplicate_category_replaces_in_place() {
        let registry = PatternRegistry::new();
        registry.register(rule(PiiCategory::Phone, r"\d{3}-\d{4}"));
        registry.register(rule(PiiCategory::Email, r"\S+@\S+"));

        let replacement = PatternRule::builder(PiiCategory::Phone, r"\d{10}")
            .risk_level(RiskLevel::High)
            .build()
            .unwrap();
        let replaced = registry.register(replacement);

        assert_eq!(replaced.map(|r| r.pattern().to_string()), Some(r"\d{3}-\d{4}".to_string()));
        let rules = registry.list();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].category(), &PiiCategory::Phone);
        assert_eq!(rules[0].risk_level(), RiskLevel::High);
    }

    #[test]
    fn unregister_removes_only_the_named_category() {
        let registry = PatternRegistry::new();
        registry.register(rule(PiiCategory::Phone, r"\d{3}-\d{4}"));
        registry.register(rule(PiiCategory::Email, r"\S+@\S+"));

        assert!(registry.unregister(&PiiCategory::Phone).is_some());
        assert!(registry.unregister(&PiiCategory::Phone).is_none());
        assert_eq!(registry.categories(), vec![PiiCategory::Email]);
    }

    #[test]
    fn snapshots_are_isolated_from_later_writes() {
        let registry = PatternRegistry::new();
        registry.register(rule(PiiCategory::Email, r"\S+@\S+"));
        let before = registry.snapshot();

        registry.register(rule(PiiCategory::Phone, r"\d{3}-\d{4}"));
        registry.unregister(&PiiCategory::Email);

        assert_eq!(before.len(), 1);
        assert_eq!(before[0].category(), &PiiCategory::Email);
        assert_eq!(registry.categories(), vec![PiiCategory::Phone]);
    }

    #[test]
    fn bad_definition_is_rejected_before_registration() {
        let registry = PatternRegistry::new();
        let definition = PatternDefinition {
            category: PiiCategory::Custom("badge".into()),
            pattern: "B-(\\d{4}".into(),
            description: String::new(),
            risk_level: RiskLevel::Moderate,
            validators: Vec::new(),
            labels: Vec::new(),
            examples: Vec::new(),
        };

        let err = registry.register_definition(definition).unwrap_err();
        assert!(matches!(err, PiiError::PatternCompilation { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn defaults_pass_self_test() {
        let registry = PatternRegistry::with_defaults().unwrap();
        assert_eq!(registry.len(), 9);
        assert!(registry.contains(&PiiCategory::GovernmentId));
        assert!(registry.self_test().is_empty());
    }

    #[test]
    fn self_test_reports_failing_examples() {
        let registry = PatternRegistry::new();
        let broken = PatternRule::builder(PiiCategory::Phone, r"\d{3}-\d{4}")
            .examples(["555-1234", "(555) 123-4567"])
            .build()
            .unwrap();
        registry.register(broken);

        assert_eq!(
            registry.self_test(),
            vec![SelfTestFailure {
                category: PiiCategory::Phone,
                example: "(555) 123-4567".into(),
            }]
        );
    }
}
