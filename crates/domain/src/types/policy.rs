use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::category::PiiCategory;
use super::levels::RiskLevel;
use super::operation::Operation;

/// Handling rule for one category within a rule table
///
/// `allow_logging` mirrors whether [`Operation::Log`] is in
/// `allowed_operations`. The builder methods keep the two in step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub category: PiiCategory,
    pub risk_level: RiskLevel,
    pub allow_logging: bool,
    pub require_masking: bool,
    pub require_encryption: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_days: Option<u32>,
    pub allowed_operations: BTreeSet<Operation>,
}

impl PolicyRule {
    /// A rule that allows every operation and requires no transform
    pub fn new(category: PiiCategory, risk_level: RiskLevel) -> Self {
        Self {
            category,
            risk_level,
            allow_logging: true,
            require_masking: false,
            require_encryption: false,
            retention_days: None,
            allowed_operations: Operation::ALL.into_iter().collect(),
        }
    }

    /// Removes an operation from the allowed set
    #[must_use]
    pub fn deny(mut self, operation: Operation) -> Self {
        self.allowed_operations.remove(&operation);
        if operation == Operation::Log {
            self.allow_logging = false;
        }
        self
    }

    /// Adds an operation to the allowed set
    #[must_use]
    pub fn allow(mut self, operation: Operation) -> Self {
        self.allowed_operations.insert(operation);
        if operation == Operation::Log {
            self.allow_logging = true;
        }
        self
    }

    #[must_use]
    pub fn with_masking(mut self, required: bool) -> Self {
        self.require_masking = required;
        self
    }

    #[must_use]
    pub fn with_encryption(mut self, required: bool) -> Self {
        self.require_encryption = required;
        self
    }

    #[must_use]
    pub fn with_retention_days(mut self, days: Option<u32>) -> Self {
        self.retention_days = days;
        self
    }

    /// Same rule re-keyed to another category
    #[must_use]
    pub fn for_category(mut self, category: PiiCategory) -> Self {
        self.category = category;
        self
    }

    pub fn allows(&self, operation: Operation) -> bool {
        self.allowed_operations.contains(&operation)
    }

    /// False when `allow_logging` disagrees with the allowed operation set
    pub fn is_consistent(&self) -> bool {
        self.allow_logging == self.allows(Operation::Log)
    }
}

/// Caller-supplied facts about the circumstances of an operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationContext {
    /// The destination is covered by an adequacy decision
    #[serde(default)]
    pub adequacy_decision: bool,
    /// The data subject consented to the operation
    #[serde(default)]
    pub consent_obtained: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl EvaluationContext {
    pub fn with_adequacy() -> Self {
        Self { adequacy_decision: true, ..Self::default() }
    }

    pub fn with_consent() -> Self {
        Self { consent_obtained: true, ..Self::default() }
    }

    #[must_use]
    pub fn purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    /// True when a cross-border transfer has a legal basis
    pub fn has_transfer_basis(&self) -> bool {
        self.adequacy_decision || self.consent_obtained
    }
}

/// Audit facts carried alongside every decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionMetadata {
    pub category: PiiCategory,
    pub operation: Operation,
    pub risk_level: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_days: Option<u32>,
}

/// Verdict for a (category, operation) pair under a rule table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub allowed: bool,
    pub requires_masking: bool,
    pub requires_encryption: bool,
    /// Present when denied or when a transform is required
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub metadata: DecisionMetadata,
}

impl PolicyDecision {
    /// Allowed with no transform required
    pub fn is_unconditional(&self) -> bool {
        self.allowed && !self.requires_masking && !self.requires_encryption
    }
}
