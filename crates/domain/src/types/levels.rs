use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Sensitivity band attached to a category by a pattern or policy rule
///
/// The same category may carry a different risk under different rule tables;
/// risk is never intrinsic to [`PiiCategory`](crate::PiiCategory).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low,
    Moderate,
    High,
    Critical,
}

impl_domain_status_conversions!(RiskLevel {
    Low => "low",
    Moderate => "moderate",
    High => "high",
    Critical => "critical",
});

impl RiskLevel {
    /// True for High and Critical
    pub fn is_elevated(self) -> bool {
        self >= Self::High
    }
}

/// Qualitative certainty band attached to a detected span
///
/// Only the four bands are ever reported. The numeric weights exist for
/// threshold comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl_domain_status_conversions!(ConfidenceLevel {
    Low => "low",
    Medium => "medium",
    High => "high",
    VeryHigh => "very_high",
});

impl ConfidenceLevel {
    /// Numeric weight used for `confidence_threshold` comparisons
    pub const fn weight(self) -> f64 {
        match self {
            Self::Low => 0.3,
            Self::Medium => 0.5,
            Self::High => 0.7,
            Self::VeryHigh => 0.9,
        }
    }

    /// One band higher, saturating at VeryHigh
    #[must_use]
    pub const fn raised(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High | Self::VeryHigh => Self::VeryHigh,
        }
    }

    /// Starting band for a span owned by a rule of the given risk
    pub const fn baseline_for(risk: RiskLevel) -> Self {
        match risk {
            RiskLevel::Critical | RiskLevel::High => Self::High,
            RiskLevel::Moderate | RiskLevel::Low => Self::Medium,
        }
    }

    /// True when the band's weight reaches `threshold`
    pub fn meets(self, threshold: f64) -> bool {
        self.weight() >= threshold
    }
}
