use std::collections::BTreeMap;

use piiguard_domain::{PiiCategory, PolicyRule};
use serde::Serialize;
use tracing::warn;

/// Category key carried by every table's fallback rule
pub fn default_rule_category() -> PiiCategory {
    PiiCategory::Custom("default".to_string())
}

/// Named, immutable mapping from category to [`PolicyRule`]
///
/// Every built-in category has an entry. Lookups for anything else fall
/// back to the default rule. To customize a table, [`derive`](Self::derive)
/// a new one; the original is never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleTable {
    name: String,
    rules: BTreeMap<PiiCategory, PolicyRule>,
    default_rule: PolicyRule,
    transfer_requires_basis: bool,
}

impl RuleTable {
    pub fn builder(name: impl Into<String>, default_rule: PolicyRule) -> RuleTableBuilder {
        RuleTableBuilder {
            name: name.into(),
            rules: BTreeMap::new(),
            default_rule: default_rule.for_category(default_rule_category()),
            transfer_requires_basis: false,
        }
    }

    /// Starts a new table from this one's rules under a new name
    pub fn derive(&self, name: impl Into<String>) -> RuleTableBuilder {
        RuleTableBuilder {
            name: name.into(),
            rules: self.rules.clone(),
            default_rule: self.default_rule.clone(),
            transfer_requires_basis: self.transfer_requires_basis,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rule for `category`, or the default rule when none is registered
    pub fn rule(&self, category: &PiiCategory) -> &PolicyRule {
        self.rules.get(category).unwrap_or(&self.default_rule)
    }

    /// Rule registered for exactly `category`
    pub fn get(&self, category: &PiiCategory) -> Option<&PolicyRule> {
        self.rules.get(category)
    }

    pub fn default_rule(&self) -> &PolicyRule {
        &self.default_rule
    }

    /// Transfers need an adequacy decision or consent in the evaluation context
    pub fn transfer_requires_basis(&self) -> bool {
        self.transfer_requires_basis
    }

    pub fn rules(&self) -> impl Iterator<Item = &PolicyRule> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Collects overrides for a new [`RuleTable`]
#[derive(Debug, Clone)]
pub struct RuleTableBuilder {
    name: String,
    rules: BTreeMap<PiiCategory, PolicyRule>,
    default_rule: PolicyRule,
    transfer_requires_basis: bool,
}

impl RuleTableBuilder {
    /// Sets the rule for `rule.category`, replacing any existing one
    #[must_use]
    pub fn rule(mut self, rule: PolicyRule) -> Self {
        self.rules.insert(rule.category.clone(), rule);
        self
    }

    #[must_use]
    pub fn rules(self, rules: impl IntoIterator<Item = PolicyRule>) -> Self {
        rules.into_iter().fold(self, Self::rule)
    }

    #[must_use]
    pub fn default_rule(mut self, rule: PolicyRule) -> Self {
        self.default_rule = rule.for_category(default_rule_category());
        self
    }

    #[must_use]
    pub fn transfer_requires_basis(mut self, required: bool) -> Self {
        self.transfer_requires_basis = required;
        self
    }

    /// Finishes the table. Built-in categories without an explicit rule
    /// receive a copy of the default rule.
    pub fn build(mut self) -> RuleTable {
        for category in PiiCategory::KNOWN {
            if !self.rules.contains_key(category) {
                let fallback = self.default_rule.clone().for_category(category.clone());
                self.rules.insert(category.clone(), fallback);
            }
        }

        for rule in self.rules.values().chain(std::iter::once(&self.default_rule)) {
            if !rule.is_consistent() {
                warn!(
                    table = %self.name,
                    category = %rule.category,
                    allow_logging = rule.allow_logging,
                    "allow_logging disagrees with allowed operations"
                );
            }
        }

        RuleTable {
            name: self.name,
            rules: self.rules,
            default_rule: self.default_rule,
            transfer_requires_basis: self.transfer_requires_basis,
        }
    }
}
