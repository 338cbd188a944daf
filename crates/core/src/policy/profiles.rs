//! Built-in rule tables
//!
//! All four profiles share one mechanism and differ only in data. Each call
//! builds a fresh table, so callers can never interfere with one another
//! through a shared instance.

use std::fmt;
use std::str::FromStr;

use piiguard_domain::{Operation, PiiCategory, PolicyRule, RiskLevel};
use serde::{Deserialize, Serialize};

use super::table::{default_rule_category, RuleTable};

/// Selector for a built-in profile, as used in policy documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinProfile {
    Permissive,
    Strict,
    #[serde(alias = "gdpr")]
    EuGdpr,
    #[serde(alias = "lgpd")]
    BrLgpd,
}

impl BuiltinProfile {
    pub const ALL: [BuiltinProfile; 4] =
        [Self::Permissive, Self::Strict, Self::EuGdpr, Self::BrLgpd];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Permissive => "permissive",
            Self::Strict => "strict",
            Self::EuGdpr => "eu_gdpr",
            Self::BrLgpd => "br_lgpd",
        }
    }

    /// Builds a fresh copy of the profile's table
    pub fn table(self) -> RuleTable {
        match self {
            Self::Permissive => permissive(),
            Self::Strict => strict(),
            Self::EuGdpr => eu_gdpr(),
            Self::BrLgpd => br_lgpd(),
        }
    }
}

impl fmt::Display for BuiltinProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuiltinProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "permissive" => Ok(Self::Permissive),
            "strict" => Ok(Self::Strict),
            "eu_gdpr" | "gdpr" => Ok(Self::EuGdpr),
            "br_lgpd" | "lgpd" => Ok(Self::BrLgpd),
            _ => Err(format!("Invalid BuiltinProfile: {s}")),
        }
    }
}

/// Sensitivity each profile assigns to a category
pub fn category_risk(category: &PiiCategory) -> RiskLevel {
    match category {
        PiiCategory::GovernmentId | PiiCategory::PaymentCard | PiiCategory::BankAccount => {
            RiskLevel::Critical
        }
        PiiCategory::StreetAddress | PiiCategory::DateOfBirth => RiskLevel::High,
        PiiCategory::Email
        | PiiCategory::Phone
        | PiiCategory::PersonName
        | PiiCategory::IpAddress
        | PiiCategory::Custom(_) => RiskLevel::Moderate,
        PiiCategory::PostalCode | PiiCategory::Organization | PiiCategory::Url => RiskLevel::Low,
    }
}

fn mandatory_encryption(category: &PiiCategory) -> bool {
    matches!(
        category,
        PiiCategory::GovernmentId | PiiCategory::PaymentCard | PiiCategory::BankAccount
    )
}

fn build(
    name: &str,
    transfer_requires_basis: bool,
    rule_for: impl Fn(&PiiCategory, RiskLevel) -> PolicyRule,
) -> RuleTable {
    let default_category = default_rule_category();
    let default_rule = rule_for(&default_category, category_risk(&default_category));

    RuleTable::builder(name, default_rule)
        .rules(PiiCategory::KNOWN.iter().map(|c| rule_for(c, category_risk(c))))
        .transfer_requires_basis(transfer_requires_basis)
        .build()
}

/// Everything allowed; only Critical categories need masking
pub fn permissive() -> RuleTable {
    build("permissive", false, |category, risk| {
        PolicyRule::new(category.clone(), risk).with_masking(risk == RiskLevel::Critical)
    })
}

/// Log and Transfer denied above Low risk, Transfer denied for Low;
/// Store needs encryption for High and Critical
pub fn strict() -> RuleTable {
    build("strict", false, |category, risk| {
        let rule = PolicyRule::new(category.clone(), risk).deny(Operation::Transfer);
        if risk > RiskLevel::Low {
            rule.deny(Operation::Log)
                .with_masking(true)
                .with_encryption(risk.is_elevated())
        } else {
            rule
        }
    })
}

fn regulatory(name: &str, retention_days: impl Fn(&PiiCategory) -> u32) -> RuleTable {
    build(name, true, |category, risk| {
        let rule = PolicyRule::new(category.clone(), risk)
            .with_masking(risk > RiskLevel::Low)
            .with_encryption(mandatory_encryption(category))
            .with_retention_days(Some(retention_days(category)));
        if risk == RiskLevel::Critical {
            rule.deny(Operation::Log)
        } else {
            rule
        }
    })
}

/// EU GDPR-style profile
///
/// Transfers need an adequacy decision or consent. Identifiers and financial
/// data must be encrypted; Critical categories may not be logged.
pub fn eu_gdpr() -> RuleTable {
    regulatory("eu_gdpr", |category| match category {
        PiiCategory::PaymentCard => 180,
        PiiCategory::IpAddress => 90,
        PiiCategory::GovernmentId | PiiCategory::DateOfBirth | PiiCategory::BankAccount => 365,
        PiiCategory::Url => 365,
        PiiCategory::Email
        | PiiCategory::Phone
        | PiiCategory::StreetAddress
        | PiiCategory::PersonName => 730,
        PiiCategory::PostalCode | PiiCategory::Organization => 1095,
        PiiCategory::Custom(_) => 365,
    })
}

/// Brazil LGPD-style profile
///
/// Same gating as [`eu_gdpr`] with Brazilian retention periods: five years
/// for most records, six months for connection logs.
pub fn br_lgpd() -> RuleTable {
    regulatory("br_lgpd", |category| match category {
        PiiCategory::IpAddress => 180,
        PiiCategory::PaymentCard | PiiCategory::Url => 365,
        PiiCategory::Email
        | PiiCategory::Phone
        | PiiCategory::StreetAddress
        | PiiCategory::PostalCode
        | PiiCategory::PersonName
        | PiiCategory::Organization
        | PiiCategory::GovernmentId
        | PiiCategory::DateOfBirth
        | PiiCategory::BankAccount => 1825,
        PiiCategory::Custom(_) => 730,
    })
}
