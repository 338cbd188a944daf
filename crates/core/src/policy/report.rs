use piiguard_domain::PolicyDecision;
use serde::{Deserialize, Serialize};

/// Outcome of checking a detection result against a rule table
///
/// Built for hand-off to an audit sink; the engine itself persists nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub table: String,
    pub compliant: bool,
    pub decisions: Vec<PolicyDecision>,
    /// Reasons of the denied decisions
    pub violations: Vec<String>,
}

impl ComplianceReport {
    pub fn from_decisions(table: impl Into<String>, decisions: Vec<PolicyDecision>) -> Self {
        let violations: Vec<String> = decisions
            .iter()
            .filter(|decision| !decision.allowed)
            .filter_map(|decision| decision.reason.clone())
            .collect();

        Self {
            table: table.into(),
            compliant: decisions.iter().all(|decision| decision.allowed),
            decisions,
            violations,
        }
    }

    /// Decisions that are allowed but need masking or encryption first
    pub fn transforms(&self) -> impl Iterator<Item = &PolicyDecision> {
        self.decisions
            .iter()
            .filter(|decision| decision.allowed && !decision.is_unconditional())
    }
}
