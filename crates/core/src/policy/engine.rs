use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use piiguard_domain::{
    DecisionMetadata, DetectionResult, EvaluationContext, Operation, PiiCategory, PolicyDecision,
};
use tracing::{debug, info, instrument};

use super::report::ComplianceReport;
use super::table::RuleTable;
use crate::error::{PiiError, PiiResult};

/// Decides whether `operation` may be applied to `category` under `table`
///
/// Never fails: categories without a rule use the table's default rule.
/// When the decision denies the operation or requires a transform, `reason`
/// reads `Operation '<op>' <verdict> for category '<category>'`, where the
/// verdict is `not allowed`, `requires masking` or `requires encryption`, in
/// that order of precedence.
#[instrument(
    level = "debug",
    skip(table, context),
    fields(table = table.name(), category = %category, operation = %operation)
)]
pub fn evaluate(
    table: &RuleTable,
    category: &PiiCategory,
    operation: Operation,
    context: &EvaluationContext,
) -> PolicyDecision {
    let rule = table.rule(category);

    let transfer_blocked = operation == Operation::Transfer
        && table.transfer_requires_basis()
        && !context.has_transfer_basis();
    let allowed = rule.allows(operation) && !transfer_blocked;
    let requires_masking = rule.require_masking && operation.is_presentation();
    let requires_encryption = rule.require_encryption && operation.is_persistence();

    let verdict = if !allowed {
        Some("not allowed")
    } else if requires_masking {
        Some("requires masking")
    } else if requires_encryption {
        Some("requires encryption")
    } else {
        None
    };
    let reason = verdict
        .map(|verdict| format!("Operation '{operation}' {verdict} for category '{category}'"));

    debug!(allowed, requires_masking, requires_encryption, transfer_blocked, "policy evaluated");

    PolicyDecision {
        allowed,
        requires_masking,
        requires_encryption,
        reason,
        metadata: DecisionMetadata {
            category: category.clone(),
            operation,
            risk_level: rule.risk_level,
            retention_days: rule.retention_days,
        },
    }
}

/// Evaluates decisions against a hot-swappable active table
///
/// Evaluation clones the active table's `Arc` and runs without holding the
/// lock, so a concurrent [`replace_table`](Self::replace_table) never blocks
/// or splits a call.
pub struct PolicyEngine {
    table: RwLock<Arc<RuleTable>>,
}

impl fmt::Debug for PolicyEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyEngine").field("table", &self.table().name()).finish()
    }
}

impl PolicyEngine {
    pub fn new(table: RuleTable) -> Self {
        Self { table: RwLock::new(Arc::new(table)) }
    }

    /// Active table
    pub fn table(&self) -> Arc<RuleTable> {
        self.table.read().clone()
    }

    /// Swaps in a new table, returning the previous one
    pub fn replace_table(&self, table: RuleTable) -> Arc<RuleTable> {
        let next = Arc::new(table);
        let previous = std::mem::replace(&mut *self.table.write(), next);
        info!(from = previous.name(), to = self.table().name(), "policy table replaced");
        previous
    }

    pub fn evaluate(
        &self,
        category: &PiiCategory,
        operation: Operation,
        context: &EvaluationContext,
    ) -> PolicyDecision {
        evaluate(&self.table(), category, operation, context)
    }

    /// Evaluates string identifiers, as received from configuration or an API
    ///
    /// # Errors
    /// [`PiiError::UnknownOperation`] when `operation` names no [`Operation`].
    /// Unknown categories are not an error; they use the default rule.
    pub fn evaluate_named(
        &self,
        category: &str,
        operation: &str,
        context: &EvaluationContext,
    ) -> PiiResult<PolicyDecision> {
        let operation: Operation =
            operation.parse().map_err(|_| PiiError::UnknownOperation(operation.to_string()))?;
        Ok(self.evaluate(&PiiCategory::from(category), operation, context))
    }

    /// One decision per distinct category in `result`, in first-seen order
    pub fn evaluate_result(
        &self,
        result: &DetectionResult,
        operation: Operation,
        context: &EvaluationContext,
    ) -> Vec<PolicyDecision> {
        let table = self.table();
        result
            .categories
            .iter()
            .map(|category| evaluate(&table, category, operation, context))
            .collect()
    }

    /// Evaluates every (category, operation) pair and collects the denials
    pub fn check_compliance(
        &self,
        result: &DetectionResult,
        operations: &[Operation],
        context: &EvaluationContext,
    ) -> ComplianceReport {
        let table = self.table();
        let decisions: Vec<PolicyDecision> = result
            .categories
            .iter()
            .flat_map(|category| {
                operations.iter().map(|&operation| evaluate(&table, category, operation, context))
            })
            .collect();

        let report = ComplianceReport::from_decisions(table.name(), decisions);
        debug!(
            table = table.name(),
            compliant = report.compliant,
            violations = report.violations.len(),
            "compliance checked"
        );
        report
    }
}
