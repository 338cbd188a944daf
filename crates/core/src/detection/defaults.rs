//! Built-in pattern set loaded by [`PatternRegistry::with_defaults`]
//!
//! [`PatternRegistry::with_defaults`]: super::PatternRegistry::with_defaults

use once_cell::sync::Lazy;
use piiguard_domain::{PiiCategory, RiskLevel};

use super::rule::{PatternDefinition, ValidatorKind};

pub(crate) const EMAIL_PATTERN: &str =
    r"(?u)\b[\p{L}\p{N}._%+-]+@[\p{L}\p{N}.-]+\.[\p{L}]{2,}\b";

const PHONE_PATTERN: &str = r"(?:\+?1[ .-]?)?(?:\(\d{3}\)|\b\d{3})[ .-]?\d{3}[ .-]\d{4}\b";

const SSN_PATTERN: &str = r"\b\d{3}-\d{2}-\d{4}\b";

// 4-4-4-4 grouped, 4-6-5 / 4-6-4 (Amex, Diners), or an unbroken 13-19 digit run
const PAYMENT_CARD_PATTERN: &str = concat!(
    r"\b(?:\d{4}[ -]?){3}\d{4}\b",
    r"|\b3\d{3}[ -]?\d{6}[ -]?\d{4,5}\b",
    r"|\b\d{13,19}\b",
);

const IBAN_PATTERN: &str = r"\b[A-Z]{2}\d{2}(?: ?[A-Z0-9]{4}){2,7}(?: ?[A-Z0-9]{1,3})?\b";

const IP_ADDRESS_PATTERN: &str = r"\b(?:\d{1,3}\.){3}\d{1,3}\b";

const URL_PATTERN: &str = r#"\bhttps?://[^\s<>"']*[^\s<>"'.,;:!?)\]]"#;

const POSTAL_CODE_PATTERN: &str = r"\b\d{5}(?:-\d{4})?\b";

// US month/day/year or ISO year-month-day
const DATE_OF_BIRTH_PATTERN: &str = concat!(
    r"\b(?:(?:0?[1-9]|1[0-2])[/-](?:0?[1-9]|[12]\d|3[01])[/-](?:19|20)\d{2}",
    r"|(?:19|20)\d{2}-(?:0[1-9]|1[0-2])-(?:0[1-9]|[12]\d|3[01]))\b",
);

fn definition(
    category: PiiCategory,
    pattern: &str,
    description: &str,
    risk_level: RiskLevel,
) -> PatternDefinition {
    PatternDefinition {
        category,
        pattern: pattern.to_string(),
        description: description.to_string(),
        risk_level,
        validators: Vec::new(),
        labels: Vec::new(),
        examples: Vec::new(),
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

static DEFAULT_DEFINITIONS: Lazy<Vec<PatternDefinition>> = Lazy::new(|| {
    vec![
        PatternDefinition {
            validators: vec![ValidatorKind::RejectLiterals {
                values: strings(&["test@test.com", "example@example.com"]),
            }],
            labels: strings(&["email", "e-mail", "mail", "contact"]),
            examples: strings(&["john.doe@example.com", "ana+news@correo.com.br"]),
            ..definition(PiiCategory::Email, EMAIL_PATTERN, "Email address", RiskLevel::Moderate)
        },
        PatternDefinition {
            validators: vec![ValidatorKind::RejectRepeatedDigits],
            labels: strings(&["phone", "tel", "call", "mobile", "cell", "fax"]),
            examples: strings(&["(555) 123-4567", "555-123-4567", "+1 555 123 4567"]),
            ..definition(
                PiiCategory::Phone,
                PHONE_PATTERN,
                "North American phone number",
                RiskLevel::Moderate,
            )
        },
        PatternDefinition {
            validators: vec![ValidatorKind::SsnStructure],
            labels: strings(&["ssn", "social security", "social security number"]),
            examples: strings(&["555-55-5555", "212-09-7731"]),
            ..definition(
                PiiCategory::GovernmentId,
                SSN_PATTERN,
                "US Social Security number",
                RiskLevel::Critical,
            )
        },
        PatternDefinition {
            validators: vec![ValidatorKind::Luhn, ValidatorKind::RejectRepeatedDigits],
            labels: strings(&["card", "credit card", "debit card", "visa", "mastercard", "amex"]),
            examples: strings(&["4111 1111 1111 1111", "5500-0000-0000-0004", "378282246310005"]),
            ..definition(
                PiiCategory::PaymentCard,
                PAYMENT_CARD_PATTERN,
                "Payment card number",
                RiskLevel::Critical,
            )
        },
        PatternDefinition {
            validators: vec![ValidatorKind::Iban],
            labels: strings(&["iban", "account", "bank account"]),
            examples: strings(&["GB82 WEST 1234 5698 7654 32", "DE89370400440532013000"]),
            ..definition(
                PiiCategory::BankAccount,
                IBAN_PATTERN,
                "International bank account number",
                RiskLevel::Critical,
            )
        },
        PatternDefinition {
            validators: vec![ValidatorKind::Ipv4Octets],
            labels: strings(&["ip", "ip address", "host", "client"]),
            examples: strings(&["192.168.10.42", "8.8.8.8"]),
            ..definition(
                PiiCategory::IpAddress,
                IP_ADDRESS_PATTERN,
                "IPv4 address",
                RiskLevel::Moderate,
            )
        },
        PatternDefinition {
            labels: strings(&["url", "link", "website"]),
            examples: strings(&["https://example.com/users/42?tab=profile"]),
            ..definition(PiiCategory::Url, URL_PATTERN, "HTTP(S) URL", RiskLevel::Low)
        },
        PatternDefinition {
            labels: strings(&["zip", "zip code", "postal", "postal code"]),
            examples: strings(&["94105", "94105-1804"]),
            ..definition(
                PiiCategory::PostalCode,
                POSTAL_CODE_PATTERN,
                "US ZIP code",
                RiskLevel::Low,
            )
        },
        PatternDefinition {
            labels: strings(&["dob", "date of birth", "born", "birthday", "birth date"]),
            examples: strings(&["04/23/1987", "1987-04-23"]),
            ..definition(
                PiiCategory::DateOfBirth,
                DATE_OF_BIRTH_PATTERN,
                "Calendar date in a birth-date format",
                RiskLevel::Moderate,
            )
        },
    ]
});

/// Built-in definitions in registration order
pub fn default_definitions() -> &'static [PatternDefinition] {
    &DEFAULT_DEFINITIONS
}
