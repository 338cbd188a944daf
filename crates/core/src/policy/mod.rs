//! Policy decisions: rule tables, built-in profiles and evaluation
//!
//! Evaluation is a pure function of (table, category, operation, context).
//! [`PolicyEngine`] only adds an atomically replaceable active table.

pub mod engine;
pub mod profiles;
pub mod report;
pub mod table;

pub use engine::{evaluate, PolicyEngine};
pub use profiles::{br_lgpd, category_risk, eu_gdpr, permissive, strict, BuiltinProfile};
pub use report::ComplianceReport;
pub use table::{default_rule_category, RuleTable, RuleTableBuilder};
