use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Classification tag for a kind of personally identifying data
///
/// The string form (`email`, `government_id`, `custom_<name>`) is the stable
/// identifier used as a map key in rule tables, configuration documents and
/// decision reasons.
///
/// # Examples
/// ```
/// use piiguard_domain::PiiCategory;
///
/// let category: PiiCategory = "payment_card".parse().unwrap();
/// assert_eq!(category, PiiCategory::PaymentCard);
/// assert_eq!(PiiCategory::Custom("badge".into()).to_string(), "custom_badge");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum PiiCategory {
    // Contact
    Email,
    Phone,
    StreetAddress,
    PostalCode,

    // Identity
    PersonName,
    Organization,
    GovernmentId,
    DateOfBirth,

    // Financial
    PaymentCard,
    BankAccount,

    // Online identifiers
    IpAddress,
    Url,

    // Caller-registered categories
    Custom(String),
}

impl PiiCategory {
    /// Every built-in category. Rule tables hold exactly one rule for each.
    pub const KNOWN: &'static [PiiCategory] = &[
        PiiCategory::Email,
        PiiCategory::Phone,
        PiiCategory::StreetAddress,
        PiiCategory::PostalCode,
        PiiCategory::PersonName,
        PiiCategory::Organization,
        PiiCategory::GovernmentId,
        PiiCategory::DateOfBirth,
        PiiCategory::PaymentCard,
        PiiCategory::BankAccount,
        PiiCategory::IpAddress,
        PiiCategory::Url,
    ];

    /// Returns the identifier used in configuration and reasons
    pub fn as_str(&self) -> &str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::StreetAddress => "street_address",
            Self::PostalCode => "postal_code",
            Self::PersonName => "person_name",
            Self::Organization => "organization",
            Self::GovernmentId => "government_id",
            Self::DateOfBirth => "date_of_birth",
            Self::PaymentCard => "payment_card",
            Self::BankAccount => "bank_account",
            Self::IpAddress => "ip_address",
            Self::Url => "url",
            Self::Custom(name) => name,
        }
    }

    /// True for categories outside the built-in set
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for PiiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(name) => write!(f, "custom_{}", name),
            other => f.write_str(other.as_str()),
        }
    }
}

impl FromStr for PiiCategory {
    type Err = std::convert::Infallible;

    /// Unrecognized identifiers become custom categories, so parsing never
    /// fails. A `custom_` prefix is stripped so that Display round-trips.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        let category = match normalized.as_str() {
            "email" => Self::Email,
            "phone" => Self::Phone,
            "street_address" | "address" => Self::StreetAddress,
            "postal_code" | "zip_code" => Self::PostalCode,
            "person_name" | "name" => Self::PersonName,
            "organization" => Self::Organization,
            "government_id" | "ssn" => Self::GovernmentId,
            "date_of_birth" | "dob" => Self::DateOfBirth,
            "payment_card" | "credit_card" => Self::PaymentCard,
            "bank_account" | "iban" => Self::BankAccount,
            "ip_address" => Self::IpAddress,
            "url" => Self::Url,
            _ => {
                let raw = s.trim();
                let name = raw.strip_prefix("custom_").unwrap_or(raw);
                Self::Custom(name.to_string())
            }
        };
        Ok(category)
    }
}

impl From<String> for PiiCategory {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(category) => category,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for PiiCategory {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<PiiCategory> for String {
    fn from(category: PiiCategory) -> Self {
        category.to_string()
    }
}
