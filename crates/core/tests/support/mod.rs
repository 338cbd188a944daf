//! Shared test helpers for `piiguard-core` integration tests.
//!
//! A scripted recognizer stands in for a real NER model, and a few text
//! fixtures cover the mixed-content cases several suites rely on.

#![allow(dead_code)]

pub mod recognizer;

use std::sync::Once;

/// Mixed-content inputs used by the property-style tests
pub const CORPUS: &[&str] = &[
    "Contact John Doe at john.doe@example.com or call (555) 123-4567",
    "My SSN is 555-55-5555",
    "alice@example.com,bob@example.org",
    "card 4111 1111 1111 1111 exp 04/23/2027, zip 94105",
    "server 192.168.10.42 logged https://example.com/u/42?tab=1.",
    "IBAN GB82 WEST 1234 5698 7654 32 for José Núñez <josé@correo.es>",
    "no personal data in this sentence at all",
    "born 1987-04-23, tel +1 555 123 4567, ssn 212-09-7731",
];

static TRACING: Once = Once::new();

/// Installs a test-writer subscriber once per test binary
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}
